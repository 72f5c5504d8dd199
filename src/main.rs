use clap::{CommandFactory, Parser};
use legend_translate::{read_glossary, Config, OpenAi, Pipeline};

#[derive(clap::Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Translate the "English" column of a .csv or .xlsx file
    Translate {
        /// Input .csv or .xlsx file
        input: std::path::PathBuf,
        /// Output .xlsx file, default is a new file under output_dir
        #[arg(short, long, value_name = "FILE")]
        output: Option<std::path::PathBuf>,
    },
    /// Serve the upload form over HTTP
    Serve {
        /// Listen address
        #[arg(short, long, default_value = "127.0.0.1:5000")]
        bind: String,
    },
    /// Show glossary terms found in a string
    Matches {
        /// Product string
        text: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> legend_translate::Result<()> {
    env_logger::init();

    // parse commandline
    let cli = Cli::parse();

    // Load config
    let config = if let Some(cfg_file) = cli.config {
        Config::with_config(&cfg_file)
    } else {
        Config::new()
    }?;

    match cli.command {
        Some(Commands::Translate { input, output }) => {
            let pipeline = Pipeline::new(&config, OpenAi::new(&config)?);
            let output = match output {
                Some(output) => {
                    pipeline.process_file_to(&input, &output).await?;
                    output
                }
                None => pipeline.process_file(&input).await?,
            };
            println!("{}", output.display());
        }
        Some(Commands::Serve { bind }) => {
            legend_translate::server::serve(config, &bind).await?;
        }
        Some(Commands::Matches { text }) => {
            let glossary = read_glossary(&config.glossary)?;
            for found in glossary.matches(&text) {
                println!("{}", found);
            }
        }
        _ => {
            // Print help
            Cli::command().print_help()?;
        }
    }

    Ok(())
}
