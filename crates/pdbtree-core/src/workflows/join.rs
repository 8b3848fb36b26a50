use crate::core::config::{JoinOptions, WriteOptionsBuilder};
use crate::core::io::input::PdbInput;
use crate::core::io::pdb::{PdbError, PdbFile};
use crate::core::io::records::{RecordError, RecordKind};
use crate::core::models::builder::PartitionError;
use crate::core::models::hierarchy::Hierarchy;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, instrument, warn};

const BANNER: &str = "REMARK JOINED FRAGMENT FILES";
const CRYST1_MISMATCH: &str = "REMARK Warning: CRYST1 mismatch.";
const CRYST1_MISSING: &str = "REMARK Warning: CRYST1 record not available.";
const CRYST1_MULTIPLE: &str = "REMARK Warning: Multiple CRYST1 records.";

/// One fragment to be joined: a label for the header log, its tree, and the
/// CRYST1 lines found in its crystallographic section.
#[derive(Debug, Clone, Default)]
pub struct FragmentSource {
    pub label: String,
    pub hierarchy: Hierarchy,
    pub cryst1_lines: Vec<String>,
}

impl FragmentSource {
    pub fn from_input(label: &str, input: &PdbInput) -> Result<Self, PartitionError> {
        Ok(Self {
            label: label.to_string(),
            hierarchy: input.construct_hierarchy()?,
            cryst1_lines: input
                .crystallographic_section()
                .iter()
                .filter(|l| RecordKind::classify(l) == RecordKind::Cryst1)
                .cloned()
                .collect(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct JoinedFragments {
    pub hierarchy: Hierarchy,
    pub header_log: Vec<String>,
}

impl JoinedFragments {
    /// The joined tree as PDB lines, with the header log on top.
    pub fn to_pdb_lines(&self) -> Result<Vec<String>, RecordError> {
        let options = WriteOptionsBuilder::new()
            .header_lines(self.header_log.clone())
            .append_end(true)
            .build();
        self.hierarchy.as_pdb_lines(&options)
    }
}

/// The combined CRYST1 prefix (columns 1-66).
enum Combined {
    Unseen,
    Kept(String),
    Dropped,
}

fn z_field(line: &str) -> String {
    line.chars().skip(66).take(4).collect()
}

fn parse_z(field: &str) -> Option<i64> {
    field.trim().parse().ok()
}

fn prefix(line: &str) -> String {
    line.chars().take(66).collect()
}

struct HeaderLog {
    lines: Vec<String>,
}

impl HeaderLog {
    fn push(&mut self, line: String) {
        self.lines.push(line);
    }

    fn warn(&mut self, line: String) {
        warn!("{}", line.trim_start_matches("REMARK Warning: "));
        self.lines.push(line);
    }

    fn z_warning(&mut self, field: &str) {
        self.warn(format!(
            "REMARK Warning: CRYST1 Z field (columns 67-70) is not an integer: \"{field:<4.4}\""
        ));
    }
}

pub fn join_fragments(sources: Vec<FragmentSource>) -> JoinedFragments {
    join_fragments_with(sources, &JoinOptions::default())
}

/// Joins fragments in order, merging models by id, and logs how their CRYST1
/// records combine. When every source has exactly one CRYST1 record and
/// all agree in columns 1-66, the log ends with that record carrying the
/// summed Z.
#[instrument(skip_all, fields(sources = sources.len()))]
pub fn join_fragments_with(sources: Vec<FragmentSource>, options: &JoinOptions) -> JoinedFragments {
    let mut log = HeaderLog {
        lines: vec![BANNER.to_string()],
    };
    if let Some(timestamp) = &options.timestamp {
        log.push(format!("REMARK {timestamp}"));
    }

    let mut combined = Combined::Unseen;
    let mut sum_z: Option<i64> = None;
    let mut hierarchy = Hierarchy::new();

    for source in sources {
        log.push(format!("REMARK {}", source.label));
        for line in &source.cryst1_lines {
            log.push(format!("REMARK {}", line.trim_end()));
            let z = z_field(line);
            match &combined {
                Combined::Unseen => {
                    combined = Combined::Kept(prefix(line));
                    sum_z = parse_z(&z);
                    if sum_z.is_none() {
                        log.z_warning(&z);
                    }
                }
                Combined::Kept(first) if *first != prefix(line) => {
                    log.warn(CRYST1_MISMATCH.to_string());
                    combined = Combined::Dropped;
                    sum_z = None;
                }
                _ => {
                    if let Some(total) = sum_z {
                        match parse_z(&z) {
                            Some(value) => sum_z = Some(total + value),
                            None => {
                                log.z_warning(&z);
                                sum_z = None;
                            }
                        }
                    }
                }
            }
        }
        match source.cryst1_lines.len() {
            0 => {
                log.warn(CRYST1_MISSING.to_string());
                sum_z = None;
            }
            1 => {}
            _ => {
                log.warn(CRYST1_MULTIPLE.to_string());
                sum_z = None;
            }
        }
        hierarchy.append_models_from(source.hierarchy);
    }

    if let Combined::Kept(first) = combined {
        let line = match sum_z {
            Some(z) => format!("{first:<66}{z:>4}"),
            None => first,
        };
        log.push(line.trim_end().to_string());
    }

    if options.reset_serials {
        hierarchy.reset_serials();
    }
    info!(
        atoms = hierarchy.atoms_count(),
        models = hierarchy.model_ids().len(),
        "Fragments joined"
    );
    JoinedFragments {
        hierarchy,
        header_log: log.lines,
    }
}

/// Reads each file and joins them, labelling each by its path.
///
/// # Errors
///
/// Returns [`PdbError`] if a file cannot be read or parsed.
#[instrument(skip_all)]
pub fn join_fragment_files<P: AsRef<Path>>(
    paths: &[P],
    options: &JoinOptions,
) -> Result<JoinedFragments, PdbError> {
    let mut sources = Vec::with_capacity(paths.len());
    for path in paths {
        let path = path.as_ref();
        let label = path.display().to_string();
        let mut reader = BufReader::new(File::open(path)?);
        let input = PdbFile::read_input(&mut reader, &label)?;
        sources.push(FragmentSource::from_input(&label, &input)?);
    }
    Ok(join_fragments_with(sources, options))
}
