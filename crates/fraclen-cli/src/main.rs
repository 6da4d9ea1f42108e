mod command;
mod util;

const LOG_VAR: &str = "FRACLEN_LOG";

fn main() -> anyhow::Result<()> {
    if pretty_env_logger::try_init_custom_env(LOG_VAR).is_err() {
        eprintln!("could not init logger");
    }
    command::run()
}
