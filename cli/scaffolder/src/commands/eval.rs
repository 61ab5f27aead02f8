//! `scaffolder eval`: decide a component's conditions for a given set of
//! variables.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use scaffolder_model::Metadata;
use scaffolder_resolve::{compile, evaluate, select_variation, variation_branches};

/// Parse `NAME=VALUE` assignments. A later assignment wins.
fn parse_vars(vars: &[String]) -> Result<BTreeMap<String, String>> {
    let mut env = BTreeMap::new();
    for var in vars {
        let (name, value) = var
            .split_once('=')
            .with_context(|| format!("invalid variable '{var}', expected NAME=VALUE"))?;
        if name.is_empty() {
            bail!("invalid variable '{var}': empty name");
        }
        env.insert(name.to_string(), value.to_string());
    }
    Ok(env)
}

pub fn run(metadata: &Metadata, component_id: &str, vars: &[String]) -> Result<String> {
    let Some(component) = metadata.component(component_id) else {
        bail!("unknown component: '{component_id}'");
    };
    let env = parse_vars(vars)?;

    let mut out = String::new();
    if let Some(cond) = &component.condition {
        out.push_str(&format!(
            "condition: {} => {}\n",
            compile(cond),
            evaluate(cond, &env)
        ));
    }

    if let Some(variations) = &component.variations {
        let active = select_variation(variations, &env).map(|v| v.subdir.as_str());
        for (subdir, expr) in variation_branches(variations) {
            let mark = if Some(subdir.as_str()) == active { '*' } else { ' ' };
            out.push_str(&format!("[{mark}] {subdir}: {expr}\n"));
        }
        if active.is_none() {
            out.push_str("no variation matches\n");
        }
    }

    if out.is_empty() {
        out = format!("{component_id}: unconditional\n");
    }
    Ok(out)
}
