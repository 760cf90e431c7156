use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use vellum_model::{create_element_by_name, ElementTag};

#[derive(Args, Debug)]
pub struct NewArgs {
    /// Element tag (Frame, Stack, Grid, Text, Image, Table, Divider, Repeater)
    pub tag: String,
}

pub fn new(args: NewArgs, config: &Config) -> Result<()> {
    println!("{}", new_element_json(&args.tag, config)?);
    Ok(())
}

fn new_element_json(tag: &str, config: &Config) -> Result<String> {
    let element = create_element_by_name(tag).with_context(|| {
        let known: Vec<&str> = ElementTag::ALL.iter().map(ElementTag::as_str).collect();
        format!("Expected one of: {}", known.join(", "))
    })?;
    Ok(config.to_json(&element)?)
}
