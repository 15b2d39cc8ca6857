#![forbid(unsafe_code)]

fn main() {
    std::process::exit(typegap_cli::run());
}
