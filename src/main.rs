use clap::Parser;

use od_primer_pairs::cancel::CancellationToken;
use od_primer_pairs::config::{Args, Command, TemplateArgs};
use od_primer_pairs::engine::{SearchOutcome, design_primer_pairs};
use od_primer_pairs::error::DesignError;
use od_primer_pairs::missing_strand::{PartnerOutcome, find_missing_strand};
use od_primer_pairs::primer::analyze_primer;
use od_primer_pairs::report::{open_output, write_pairs, write_partner};
use od_primer_pairs::sequence::{Strand, Template, read_fasta_template};

fn load_template(input: &TemplateArgs) -> Result<Template, DesignError> {
    match (&input.template, &input.fasta) {
        (Some(sequence), _) => Template::new(sequence),
        (None, Some(path)) => {
            log::info!("Reading template from {}", path);
            let (name, template) = read_fasta_template(path)?;
            log::info!("Using record {} ({} bp)", name, template.len());
            Ok(template)
        }
        (None, None) => Err(DesignError::InvalidConfig(
            "either --template or --fasta is required".to_string(),
        )),
    }
}

fn main() -> Result<(), DesignError> {
    env_logger::init();

    let args = Args::parse();
    match args.command {
        Command::Design {
            input,
            design,
            output,
        } => {
            let template = load_template(&input)?;
            let config = design.to_config();
            log::debug!("config: {:?}", config);
            match design_primer_pairs(&template, &config, &CancellationToken::new())? {
                SearchOutcome::Completed(report) => {
                    log::info!("{}", report.status);
                    if let Some(tm) = report.stats.forward_tm {
                        log::info!("Forward Tm {:.2} +/- {:.2}", tm.mean, tm.std);
                    }
                    if let Some(tm) = report.stats.reverse_tm {
                        log::info!("Reverse Tm {:.2} +/- {:.2}", tm.mean, tm.std);
                    }
                    write_pairs(open_output(output.as_deref())?, &report.pairs)?;
                }
                SearchOutcome::Cancelled => log::warn!("Search cancelled"),
            }
        }
        Command::Complete {
            input,
            design,
            primer,
            strand,
            output,
        } => {
            let template = load_template(&input)?;
            let config = design.to_config();
            let strand = match strand.as_str() {
                "reverse" => Strand::Reverse,
                _ => Strand::Forward,
            };
            match find_missing_strand(&template, &primer, strand, &config)? {
                PartnerOutcome::Found(partner) => {
                    write_partner(open_output(output.as_deref())?, &partner)?;
                }
                PartnerOutcome::PrimerAbsent => {
                    log::warn!("Primer {} does not occur on the template", primer);
                }
                PartnerOutcome::NoSuitablePartner => {
                    log::warn!("No partner primer satisfies the Tm and GC limits");
                }
            }
        }
        Command::Analyze { primer, design } => {
            let metrics = analyze_primer(&primer, &design.to_config())?;
            println!("Tm:               {:.1} C", metrics.tm);
            println!("GC:               {:.1} %", metrics.gc_percent);
            println!("MW:               {:.1} g/mol", metrics.molecular_weight);
            println!("3' stability:     {:.2} kcal/mol", metrics.end_stability);
            println!("Hairpin dG:       {:.2} kcal/mol", metrics.hairpin_delta_g);
            println!("Self-dimer dG:    {:.2} kcal/mol", metrics.self_dimer_delta_g);
            println!("Self-comp run:    {}", metrics.self_complementarity_run);
            println!("Any-comp total:   {}", metrics.any_complementarity);
            for warning in &metrics.warnings {
                println!("warning: {}", warning);
            }
        }
    }
    Ok(())
}
