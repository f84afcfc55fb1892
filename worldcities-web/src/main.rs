use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use structopt::StructOpt;
use tracing::error;

use worldcities_core::loader::{parse_data_file, LoadPolicy};
use worldcities_core::locations_db::LocationsDb;
use worldcities_web::{init_logging, serve};

#[derive(StructOpt)]
struct CliArgs {
    #[structopt(
        long = "log-level",
        env = "WORLDCITIES_LOG_LEVEL",
        case_insensitive = true,
        default_value = "INFO"
    )]
    log_level: tracing::Level,
    #[structopt(
        long = "data-file",
        env = "WORLDCITIES_DATA_FILE",
        parse(from_os_str),
        default_value = "data/worldcities.xlsx"
    )]
    data_file: PathBuf,
    #[structopt(long, env = "WORLDCITIES_SHEET", default_value = "Sheet1")]
    sheet: String,
    #[structopt(long, env = "WORLDCITIES_HOST", default_value = "0.0.0.0")]
    host: IpAddr,
    #[structopt(long, env = "WORLDCITIES_PORT", default_value = "3001")]
    port: u16,
    /// Refuse to start if any data row fails to parse
    #[structopt(long)]
    strict: bool,
}

fn main() -> anyhow::Result<()> {
    let args = CliArgs::from_args();
    init_logging(args.log_level);

    let policy = match args.strict {
        true => LoadPolicy::Strict,
        false => LoadPolicy::Lenient,
    };
    let db = match parse_data_file(&args.data_file, &args.sheet, policy) {
        Ok(db) => db,
        Err(err) if policy == LoadPolicy::Lenient => {
            error!("Cannot load {:?}: {}", args.data_file, err);
            LocationsDb::default().mk_autocomplete()
        }
        Err(err) => {
            return Err(anyhow::Error::new(err).context(format!(
                "cannot load locations from {:?}",
                args.data_file
            )))
        }
    };

    let addr = SocketAddr::new(args.host, args.port);
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(addr, Arc::new(db)))
}
