mod cli;
mod cmd;

fn main() -> anyhow::Result<()> {
    cli::main()
}
