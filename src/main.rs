fn main() -> anyhow::Result<()> {
    eventlog_flattener::cli::run()
}
