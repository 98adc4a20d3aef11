use shiftview::{Config, run};

fn main() -> anyhow::Result<()> {
    run(Config::default())
}
