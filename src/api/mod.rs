use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::process::ExitCode;

use axum::{
    Form, Router,
    extract::{Json, Query},
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::core::{
    FIELD_KPI_ENABLED, FIELD_KPI_PERCENTAGE, FIELD_KPI_PERIOD, FIELD_MONTHLY_BONUS, FIELD_RK_RATE,
    FIELD_SALARY, FIELD_SN_PERCENTAGE, KpiPeriod, PayrollError, Projection, format_number,
    project_from_fields,
};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

const EXIT_INVALID_INPUT: u8 = 1;
const EXIT_COMPUTATION_FAILED: u8 = 2;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliKpiPeriod {
    Quarter,
    #[value(alias = "half-year")]
    Halfyear,
}

impl From<CliKpiPeriod> for KpiPeriod {
    fn from(value: CliKpiPeriod) -> Self {
        match value {
            CliKpiPeriod::Quarter => KpiPeriod::Quarter,
            CliKpiPeriod::Halfyear => KpiPeriod::HalfYear,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "payroll",
    about = "Monthly salary projection with progressive year-to-date income tax"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the calculator page and the JSON API
    Serve(ServeArgs),
    /// Project one year of salary and print it
    Project(ProjectArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[arg(long, env = "PAYROLL_HOST", default_value = "0.0.0.0")]
    host: IpAddr,
    #[arg(long, env = "PAYROLL_PORT", default_value_t = 8080)]
    port: u16,
}

#[derive(Args, Debug)]
struct ProjectArgs {
    #[arg(long, help = "Monthly base salary")]
    salary: f64,
    #[arg(long, default_value_t = 0.0, help = "Fixed monthly bonus")]
    monthly_bonus: f64,
    #[arg(
        long,
        help = "KPI bonus in percent of period income; setting it enables KPI"
    )]
    kpi_percentage: Option<f64>,
    #[arg(long, value_enum, default_value_t = CliKpiPeriod::Quarter)]
    kpi_period: CliKpiPeriod,
    #[arg(
        long,
        default_value_t = 1.0,
        help = "Regional coefficient (РК), e.g. 1.5"
    )]
    rk_rate: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Northern allowance (СН) in percent"
    )]
    sn_percentage: f64,
    #[arg(long, help = "Print the JSON document the HTTP API returns")]
    json: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    errors: Vec<String>,
}

/// Form fields equivalent to what the web page would submit.
fn fields_from_args(args: &ProjectArgs) -> HashMap<String, String> {
    let mut fields = HashMap::from([
        (FIELD_SALARY.to_string(), args.salary.to_string()),
        (FIELD_MONTHLY_BONUS.to_string(), args.monthly_bonus.to_string()),
        (FIELD_RK_RATE.to_string(), args.rk_rate.to_string()),
        (FIELD_SN_PERCENTAGE.to_string(), args.sn_percentage.to_string()),
    ]);
    if let Some(percentage) = args.kpi_percentage {
        fields.insert(FIELD_KPI_ENABLED.to_string(), "on".to_string());
        fields.insert(FIELD_KPI_PERCENTAGE.to_string(), percentage.to_string());
        fields.insert(
            FIELD_KPI_PERIOD.to_string(),
            KpiPeriod::from(args.kpi_period).as_str().to_string(),
        );
    }
    fields
}

pub async fn run_cli() -> ExitCode {
    match Cli::parse().command {
        Command::Serve(args) => {
            let addr = SocketAddr::new(args.host, args.port);
            match run_http_server(addr).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    error!(error = %e, "server error");
                    ExitCode::FAILURE
                }
            }
        }
        Command::Project(args) => run_project(&args),
    }
}

fn run_project(args: &ProjectArgs) -> ExitCode {
    let fields = fields_from_args(args);
    let projection = match project_from_fields(&fields) {
        Ok(projection) => projection,
        Err(err) => {
            log_payroll_error(&err);
            for message in err.user_messages() {
                eprintln!("{message}");
            }
            return match err {
                PayrollError::Validation(_) => ExitCode::from(EXIT_INVALID_INPUT),
                PayrollError::Computation(_) => ExitCode::from(EXIT_COMPUTATION_FAILED),
            };
        }
    };

    if args.json {
        match serde_json::to_string_pretty(&projection) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                error!(error = %e, "failed to serialize projection");
                return ExitCode::from(EXIT_COMPUTATION_FAILED);
            }
        }
    } else {
        print!("{}", render_table(&projection));
    }
    ExitCode::SUCCESS
}

/// Plain-text table of the projection, one row per month plus a totals row.
fn render_table(projection: &Projection) -> String {
    let mut out = format!(
        "{:<10} {:>12} {:>10} {:>10} {:>12} {:>14}  {}\n",
        "Месяц", "Доход", "KPI", "НДФЛ", "На руки", "Нарастающий", "Ставки"
    );
    for month in &projection.months {
        let kpi = match month.kpi_note {
            Some(note) => format!("{} {}", format_number(month.kpi_bonus), note.label()),
            None => format_number(month.kpi_bonus),
        };
        out.push_str(&format!(
            "{:<10} {:>12} {:>10} {:>10} {:>12} {:>14}  {}\n",
            month.month,
            format_number(month.total_income),
            kpi,
            format_number(month.total_tax),
            format_number(month.net_income),
            format_number(month.cumulative_income),
            month.rate_breakdown,
        ));
    }
    out.push_str(&format!(
        "{:<10} {:>12} {:>10} {:>10} {:>12}\n",
        "Итого",
        format_number(projection.annual.annual_income),
        "",
        format_number(projection.annual.annual_tax),
        format_number(projection.annual.annual_net_income),
    ));
    out
}

fn router() -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/salary",
            get(salary_get_handler).post(salary_post_handler),
        )
        .fallback(not_found_handler)
}

pub async fn run_http_server(addr: SocketAddr) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("payroll calculator listening on http://{addr}");

    axum::serve(listener, router()).await
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, vec!["Not found".to_string()])
}

async fn salary_get_handler(Query(fields): Query<HashMap<String, String>>) -> Response {
    salary_handler_impl(fields)
}

async fn salary_post_handler(Form(fields): Form<HashMap<String, String>>) -> Response {
    salary_handler_impl(fields)
}

fn salary_handler_impl(fields: HashMap<String, String>) -> Response {
    debug!(?fields, "salary projection requested");
    match project_from_fields(&fields) {
        Ok(projection) => json_response(StatusCode::OK, projection),
        Err(err) => payroll_error_response(&err),
    }
}

fn log_payroll_error(err: &PayrollError) {
    match err {
        PayrollError::Validation(messages) => {
            info!(count = messages.len(), "rejected invalid salary input")
        }
        PayrollError::Computation(cause) => warn!(%cause, "salary projection failed"),
    }
}

fn payroll_error_response(err: &PayrollError) -> Response {
    log_payroll_error(err);
    let status = match err {
        PayrollError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PayrollError::Computation(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err.user_messages())
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, errors: Vec<String>) -> Response {
    json_response(status, ErrorResponse { errors })
}
