use crate::args::PlaceholderArgs;
use crate::config::LoadedConfig;
use crate::dataset::Template;

use super::evaluate::read_template;

pub fn list_providers(loaded: &LoadedConfig) {
    if !loaded.config_exists {
        println!(
            "No config file at {}; add [providers.<name>] entries there.",
            loaded.paths.config_file.display()
        );
        return;
    }
    let config = &loaded.config;
    if config.providers.is_empty() {
        println!("No providers configured");
        return;
    }
    for (name, provider) in &config.providers {
        let marker = if config.default_provider.as_deref() == Some(name.as_str()) {
            "*"
        } else {
            " "
        };
        let model = provider.model.as_deref().unwrap_or("-");
        let url = provider.base_url.as_deref().unwrap_or("-");
        match provider.description.as_deref() {
            Some(description) => println!("{marker} {name} ({model}) {url} - {description}"),
            None => println!("{marker} {name} ({model}) {url}"),
        }
    }
}

pub fn print_placeholders(args: &PlaceholderArgs) -> anyhow::Result<()> {
    let template = Template::parse(read_template(args.template.as_deref(), args.prompt.as_deref())?)?;
    let placeholders = template.placeholders();
    if placeholders.is_empty() {
        println!("No placeholders found");
    }
    for name in placeholders {
        println!("{name}");
    }
    Ok(())
}
