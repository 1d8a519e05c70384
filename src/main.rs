//! Prasaddys CLI binary entry point.

use prasaddys::cli::{AlbumsCommands, AuthCommands, Cli, Commands, YoutubeCommands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse_args();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Commands::Auth(auth) = &cli.command {
        if matches!(auth.command, AuthCommands::Status) {
            return prasaddys::cli::auth::handle_status().await;
        }
    }

    let config = cli.load_config()?;
    match cli.command {
        Commands::Auth(auth_args) => match auth_args.command {
            AuthCommands::Login(args) => {
                config.validate(!args.device)?;
                prasaddys::cli::auth::handle_login(&config, args.device, args.email.as_deref())
                    .await
            }
            AuthCommands::Status => prasaddys::cli::auth::handle_status().await,
            AuthCommands::Logout => prasaddys::cli::auth::handle_logout(&config).await,
            AuthCommands::Refresh => prasaddys::cli::auth::handle_refresh(&config).await,
        },
        Commands::Albums(albums) => match albums.command {
            AlbumsCommands::List(page) => {
                prasaddys::cli::media::handle_albums_list(&config, page.page, page.limit).await
            }
            AlbumsCommands::Search(args) => {
                prasaddys::cli::media::handle_albums_search(
                    &config,
                    &args.query,
                    args.page.page,
                    args.page.limit,
                )
                .await
            }
        },
        Commands::Youtube(yt) => match yt.command {
            YoutubeCommands::Search(args) => {
                prasaddys::cli::media::handle_youtube_search(
                    &config,
                    &args.query,
                    args.page_token.as_deref(),
                )
                .await
            }
        },
    }
}
