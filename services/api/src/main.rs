use kpi_scorecard_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("kpi-scorecard error: {err}");
        std::process::exit(1);
    }
}
