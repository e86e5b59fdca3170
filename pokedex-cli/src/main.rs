//! Entry point for the Pokédex command-line interface.
#![forbid(unsafe_code)]

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = pokedex_cli::run().await {
        eprintln!("pokedex: {err}");
        std::process::exit(1);
    }
}
