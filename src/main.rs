use log::{ error, info };

use weightrank::{ cli, Config, Result };


fn main() {
  env_logger::init();
  if let Err(err) = run() {
    error!("{err}");
    eprintln!("error: {err}");
    std::process::exit(1);
  }
}

fn run() -> Result<()> {
  let args = cli::parse_env()?;
  if args.help {
    println!("{}", cli::USAGE);
    return Ok(())
  }

  let mut config = match &args.config {
    Some(path) => {
      info!("loading config from {}", path.display());
      Config::from_path(path)?
    },
    None => Config::default(),
  };
  if let Some(out) = args.out {
    config.out_dir = out;
  }

  weightrank::run(args.mode, args.input.as_deref(), &config)?;
  Ok(())
}
