#[tokio::main]
async fn main() {
    if let Err(e) = exams_api::run().await {
        eprintln!("exams-api fatal: {e:#}");
        std::process::exit(1);
    }
}
