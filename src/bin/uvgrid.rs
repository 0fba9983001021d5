use std::io::{self, IsTerminal, Write};
use uvgrid::{RenderConfig, batch, msh::Msh};

fn main() -> io::Result<()> {
    let args = std::env::args_os().skip(1).collect::<Vec<_>>();
    if args.is_empty() {
        return Ok(());
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let stdout = io::stdout();
    let highlight = stdout.is_terminal();
    let mut out = stdout.lock();

    let cfg = RenderConfig::from_args(&args, &mut out)?;
    let outcomes = batch::run(&cfg, &Msh, &mut out, highlight)?;

    let saved = outcomes.iter().filter(|o| o.is_saved()).count();
    log::info!("Saved {saved} of {} grids", outcomes.len());
    out.flush()
}
