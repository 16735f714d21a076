#![forbid(unsafe_code)]

fn main() {
    bedmesh_snapshot::init_logging();
    if let Err(error) = bedmesh_snapshot::run_from_env() {
        eprintln!("{error}");
        std::process::exit(error.exit_code());
    }
}
