use miette::{IntoDiagnostic, Result};

use mvnres_core::config::ResolverConfig;
use mvnres_printer::{PrintOptions, Section};
use mvnres_resolver::context::ResolverContext;
use mvnres_util::errors::ResolverError;

use crate::cli::Cli;
use crate::tracer::Tracer;

pub fn run(args: Cli) -> Result<()> {
    let mut config = ResolverConfig::default();
    if let Some(jdk) = &args.jdk {
        config = config.with_jdk_version(jdk.clone());
    }
    if let Some(m2_home) = &args.m2_home {
        config = config.with_m2_home(m2_home.clone());
    }
    config.color = !args.no_color && console::colors_enabled();

    let initial_properties = parse_properties(&args.properties)?;
    for (name, value) in &initial_properties {
        config = config.with_property(name.clone(), value.clone());
    }

    let mut ctx = ResolverContext::new(config);
    let project = mvnres_resolver::resolver::resolve(&mut ctx, &args.pom, &initial_properties)?;

    let sections = if args.sections.is_empty() {
        Section::ALL.to_vec()
    } else {
        args.sections
            .iter()
            .map(|raw| {
                Section::parse(raw).ok_or_else(|| {
                    ResolverError::Generic {
                        message: format!("unknown section '{raw}'"),
                    }
                    .into()
                })
            })
            .collect::<Result<Vec<_>>>()?
    };

    let color = ctx.config.color;
    let options = PrintOptions {
        indent: 120,
        color,
        basic: args.basic,
        sections,
    };

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    mvnres_printer::print_project(&mut handle, &project, &options).into_diagnostic()?;

    for warning in &ctx.warnings {
        tracing::warn!(%warning, "resolution warning");
    }

    let mut tracer = Tracer::new(args.trace_poms, args.trace_deps, args.trace_props, args.trace_ranges);
    if tracer.is_active() {
        println!();
        tracer.report(&mut handle, &ctx, &project).into_diagnostic()?;
    }

    Ok(())
}

fn parse_properties(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|entry| match entry.split_once('=') {
            Some((name, value)) => Ok((name.to_string(), value.to_string())),
            None => Err(ResolverError::Generic {
                message: format!("-D '{entry}' is not in the form name=value"),
            }
            .into()),
        })
        .collect()
}
