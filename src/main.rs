fn main() {
    #[cfg(feature = "cli")]
    lcwpack::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("lcwpack: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
