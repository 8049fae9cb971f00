use std::path::PathBuf;

use layoutfmt_compiler::{Declarer, Estimator};
use layoutfmt_core::{ApiFamily, TypeRegistry};

use super::input::load_reflection;

pub struct EstimateArgs {
    pub reflection_path: PathBuf,
    pub api: ApiFamily,
    pub declare: bool,
    pub name: Option<String>,
}

pub fn run(args: EstimateArgs) {
    let members = match load_reflection(&args.reflection_path) {
        Ok(members) => members,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    // Reflection input carries no pointee types.
    let registry = TypeRegistry::new();
    let rules = Estimator::new(args.api, &registry).estimate(&members);

    if args.declare {
        let name = args.name.as_deref().unwrap_or("Root");
        print!(
            "{}",
            Declarer::new(rules, &registry)
                .api(args.api)
                .declare(name, &members, 0)
        );
    } else {
        print!("{}", rules.describe(args.api));
    }
}
