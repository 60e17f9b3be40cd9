use clap::Parser;

/// Relay server for shared code editing rooms
#[derive(Debug, Clone, Parser)]
#[command(name = "codeshare-server", version, about)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "CODESHARE_HOST", default_value = "0.0.0.0")]
    pub host: String,
    /// Port to listen on
    #[arg(long, env = "CODESHARE_PORT", default_value_t = 8080)]
    pub port: u16,
}

impl Config {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_every_interface() {
        let config = Config::try_parse_from(["codeshare-server"]).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn flags_override_defaults() {
        let config =
            Config::try_parse_from(["codeshare-server", "--host", "127.0.0.1", "--port", "9000"])
                .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:9000");
    }
}
