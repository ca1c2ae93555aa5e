#[tokio::main]
async fn main() {
    if let Err(err) = fitness_booking::run().await {
        eprintln!("server error: {err}");
        std::process::exit(1);
    }
}
