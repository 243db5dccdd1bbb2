//! Minimal CLI over the credential hasher. Every command goes through the same
//! `CredentialHasher`, configured from the environment or from the JSON file
//! named by `CREDHASH_CONFIG`.

use std::env;

use credhash::config::{load_config, HasherConfig};
use credhash::crypto::cost::CostFactor;
use credhash::crypto::passwords::{CredentialHasher, EncodedHash};
use credhash::logging;
use serde_json::json;

const CONFIG_ENV: &str = "CREDHASH_CONFIG";
const DEMO_PASSWORD: &str = "s3cr3t-password";

fn print_usage() {
    eprintln!("Commands:\n  hash-password <plaintext>\n  verify-password <plaintext> <bcrypt-hash>\n  needs-rehash <bcrypt-hash> [desired-rounds]\n  inspect <bcrypt-hash>\n  show-config [path]\n  demo");
}

fn resolve_config(path: Option<&str>) -> Option<HasherConfig> {
    let path = path.map(str::to_string).or_else(|| env::var(CONFIG_ENV).ok());
    match path {
        Some(path) => match load_config(&path) {
            Ok(config) => Some(config),
            Err(err) => {
                eprintln!("config load failed: {err}");
                None
            }
        },
        None => Some(HasherConfig::from_env()),
    }
}

fn main() {
    logging::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    let config_path = match args[1].as_str() {
        "show-config" => args.get(2).map(String::as_str),
        _ => None,
    };
    let Some(config) = resolve_config(config_path) else {
        std::process::exit(1);
    };
    let hasher = CredentialHasher::from_config(config);

    match args[1].as_str() {
        "hash-password" => {
            if args.len() != 3 {
                return print_usage();
            }
            match hasher.hash_password(&args[2]) {
                Ok(hash) => println!("{hash}"),
                Err(err) => {
                    eprintln!("hashing failed: {err}");
                    std::process::exit(1);
                }
            }
        }
        "verify-password" => {
            if args.len() != 4 {
                return print_usage();
            }
            let matches = hasher.check_password(&args[2], &args[3]);
            println!("{}", if matches { "match" } else { "no-match" });
        }
        "needs-rehash" => {
            if args.len() != 3 && args.len() != 4 {
                return print_usage();
            }
            let desired = args.get(3).map(|raw| CostFactor::normalize(Some(raw.as_str())));
            let stale = hasher.needs_rehash(&args[2], desired);
            println!("{}", if stale { "rehash" } else { "current" });
        }
        "inspect" => {
            if args.len() != 3 {
                return print_usage();
            }
            match EncodedHash::parse_cost(args[2].as_bytes()) {
                Ok(cost) => println!("cost: {cost}"),
                Err(err) => println!("malformed: {err}"),
            }
        }
        "show-config" => {
            if args.len() > 3 {
                return print_usage();
            }
            let printable = json!({
                "bcryptRounds": hasher.cost().get(),
                "pepper": if hasher.has_pepper() { "set" } else { "unset" },
            });
            println!("{printable:#}");
        }
        "demo" => {
            let stored = match hasher.hash_password(DEMO_PASSWORD) {
                Ok(hash) => hash,
                Err(err) => {
                    eprintln!("hashing failed: {err}");
                    std::process::exit(1);
                }
            };
            println!("hash: {stored}");
            println!("valid: {}", hasher.check_password(DEMO_PASSWORD, &stored));
            println!("needs rehash: {}", hasher.needs_rehash(&stored, None));
        }
        _ => print_usage(),
    }
}
