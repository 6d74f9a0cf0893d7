use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cfg = tui_tunnel::config::Config::parse();
    tui_tunnel::app::run(cfg)
}
