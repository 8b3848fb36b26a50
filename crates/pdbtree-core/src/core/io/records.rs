use super::columns::{
    ColumnSpan, ColumnSpec, FieldType, Justify, LineWriter, raw_field, read_char, read_hybrid36,
    read_int, read_optional_int, read_real, read_text,
};
use super::hybrid36::Hy36Error;
use nalgebra::Point3;
use std::fmt;
use thiserror::Error;

use FieldType::{Hybrid36, Integer, Real, Text};
use Justify::{Left, Right};

/// The record kinds this crate distinguishes, resolved once per line from the
/// leading keyword (columns 1-6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Atom,
    Hetatm,
    Anisou,
    Cryst1,
    /// `SCALE1`, `SCALE2` or `SCALE3`.
    Scale(u8),
    /// `ORIGXn` / `MTRIXn`, kept verbatim in the crystallographic section.
    Crystallographic,
    Model,
    Endmdl,
    Ter,
    Break,
    Header,
    /// Any other title-section keyword (TITLE, COMPND, SOURCE, ...).
    Title,
    Remark,
    End,
    Other,
}

const TITLE_KEYWORDS: [&str; 14] = [
    "OBSLTE", "TITLE ", "SPLIT ", "CAVEAT", "COMPND", "SOURCE", "KEYWDS", "EXPDTA", "NUMMDL",
    "MDLTYP", "AUTHOR", "REVDAT", "SPRSDE", "JRNL  ",
];

const KEYWORD: ColumnSpec = ColumnSpec::new("record name", 1, 6, Text, Left);

impl RecordKind {
    pub fn classify(line: &str) -> Self {
        let keyword = raw_field(line, &KEYWORD);
        match keyword.as_ref() {
            "ATOM  " => Self::Atom,
            "HETATM" => Self::Hetatm,
            "ANISOU" => Self::Anisou,
            "CRYST1" => Self::Cryst1,
            "SCALE1" => Self::Scale(1),
            "SCALE2" => Self::Scale(2),
            "SCALE3" => Self::Scale(3),
            "ORIGX1" | "ORIGX2" | "ORIGX3" | "MTRIX1" | "MTRIX2" | "MTRIX3" => {
                Self::Crystallographic
            }
            "MODEL " => Self::Model,
            "ENDMDL" => Self::Endmdl,
            "TER   " => Self::Ter,
            "BREAK " => Self::Break,
            "HEADER" => Self::Header,
            "REMARK" => Self::Remark,
            "END   " => Self::End,
            k if TITLE_KEYWORDS.contains(&k) => Self::Title,
            _ => Self::Other,
        }
    }

    pub fn is_atom(&self) -> bool {
        matches!(self, Self::Atom | Self::Hetatm)
    }

    pub fn is_crystallographic(&self) -> bool {
        matches!(self, Self::Cryst1 | Self::Scale(_) | Self::Crystallographic)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom => write!(f, "ATOM"),
            Self::Hetatm => write!(f, "HETATM"),
            Self::Anisou => write!(f, "ANISOU"),
            Self::Cryst1 => write!(f, "CRYST1"),
            Self::Scale(n) => write!(f, "SCALE{n}"),
            Self::Crystallographic => write!(f, "ORIGX/MTRIX"),
            Self::Model => write!(f, "MODEL"),
            Self::Endmdl => write!(f, "ENDMDL"),
            Self::Ter => write!(f, "TER"),
            Self::Break => write!(f, "BREAK"),
            Self::Header => write!(f, "HEADER"),
            Self::Title => write!(f, "title"),
            Self::Remark => write!(f, "REMARK"),
            Self::End => write!(f, "END"),
            Self::Other => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Invalid {field} in {record} record (columns {columns}, value: '{raw}')")]
    FieldFormat {
        record: RecordKind,
        field: &'static str,
        columns: ColumnSpan,
        raw: String,
    },
    #[error("Value '{text}' does not fit {field} of {record} record (columns {columns})")]
    FieldOverflow {
        record: RecordKind,
        field: &'static str,
        columns: ColumnSpan,
        text: String,
    },
    #[error(transparent)]
    Numeric(#[from] Hy36Error),
    #[error("Expected a {expected} record, found '{line}'")]
    WrongKind { expected: RecordKind, line: String },
}

pub mod atom_columns {
    use super::*;

    pub const SERIAL: ColumnSpec = ColumnSpec::new("serial", 7, 11, Hybrid36, Right);
    pub const NAME: ColumnSpec = ColumnSpec::new("name", 13, 16, Text, Left);
    pub const ALTLOC: ColumnSpec = ColumnSpec::new("altLoc", 17, 17, Text, Left);
    pub const RESNAME: ColumnSpec = ColumnSpec::new("resName", 18, 20, Text, Right);
    pub const CHAIN_ID: ColumnSpec = ColumnSpec::new("chainID", 21, 22, Text, Right);
    pub const RESSEQ: ColumnSpec = ColumnSpec::new("resSeq", 23, 26, Hybrid36, Right);
    pub const ICODE: ColumnSpec = ColumnSpec::new("iCode", 27, 27, Text, Left);
    pub const X: ColumnSpec = ColumnSpec::new("x", 31, 38, Real(3), Right);
    pub const Y: ColumnSpec = ColumnSpec::new("y", 39, 46, Real(3), Right);
    pub const Z: ColumnSpec = ColumnSpec::new("z", 47, 54, Real(3), Right);
    pub const OCCUPANCY: ColumnSpec = ColumnSpec::new("occupancy", 55, 60, Real(2), Right);
    pub const TEMP_FACTOR: ColumnSpec = ColumnSpec::new("tempFactor", 61, 66, Real(2), Right);
    pub const SEGID: ColumnSpec = ColumnSpec::new("segID", 73, 76, Text, Left);
    pub const ELEMENT: ColumnSpec = ColumnSpec::new("element", 77, 78, Text, Right);
    pub const CHARGE: ColumnSpec = ColumnSpec::new("charge", 79, 80, Text, Right);

    pub const U: [ColumnSpec; 6] = [
        ColumnSpec::new("U11", 29, 35, Integer, Right),
        ColumnSpec::new("U22", 36, 42, Integer, Right),
        ColumnSpec::new("U33", 43, 49, Integer, Right),
        ColumnSpec::new("U12", 50, 56, Integer, Right),
        ColumnSpec::new("U13", 57, 63, Integer, Right),
        ColumnSpec::new("U23", 64, 70, Integer, Right),
    ];
}

pub mod cryst1_columns {
    use super::*;

    pub const CELL: [ColumnSpec; 6] = [
        ColumnSpec::new("a", 7, 15, Real(3), Right),
        ColumnSpec::new("b", 16, 24, Real(3), Right),
        ColumnSpec::new("c", 25, 33, Real(3), Right),
        ColumnSpec::new("alpha", 34, 40, Real(2), Right),
        ColumnSpec::new("beta", 41, 47, Real(2), Right),
        ColumnSpec::new("gamma", 48, 54, Real(2), Right),
    ];
    pub const SPACE_GROUP: ColumnSpec = ColumnSpec::new("sGroup", 56, 66, Text, Left);
    pub const Z: ColumnSpec = ColumnSpec::new("z", 67, 70, Integer, Right);
}

pub mod scale_columns {
    use super::*;

    pub const ROW: [ColumnSpec; 3] = [
        ColumnSpec::new("Sn1", 11, 20, Real(6), Right),
        ColumnSpec::new("Sn2", 21, 30, Real(6), Right),
        ColumnSpec::new("Sn3", 31, 40, Real(6), Right),
    ];
    pub const TRANSLATION: ColumnSpec = ColumnSpec::new("Un", 46, 55, Real(5), Right);
}

const MODEL_ID: ColumnSpec = ColumnSpec::new("model id", 7, 14, Text, Right);

/// A 4-character atom name slot (columns 13-16).
///
/// The slot keeps its column alignment, so `" CA "` (C-alpha) and `"CA  "`
/// (calcium) remain distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AtomName(String);

impl AtomName {
    /// Places a bare name into a slot. Names shorter than four characters
    /// start in column 14; four-character names are kept verbatim.
    pub fn new(name: &str) -> Self {
        let count = name.chars().count();
        if count >= 4 {
            Self(name.chars().take(4).collect())
        } else {
            Self(format!(" {name:<3}"))
        }
    }

    /// Wraps raw slot text, padding to four characters.
    pub fn from_slot(slot: &str) -> Self {
        let truncated: String = slot.chars().take(4).collect();
        Self(format!("{truncated:<4}"))
    }

    pub fn slot(&self) -> &str {
        &self.0
    }

    pub fn trimmed(&self) -> &str {
        self.0.trim()
    }

    pub fn is_blank(&self) -> bool {
        self.trimmed().is_empty()
    }
}

impl fmt::Display for AtomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AtomName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Residue and atom labels shared by ATOM/HETATM and ANISOU records.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomLabels {
    pub serial: i64,
    pub name: AtomName,
    pub altloc: char,
    pub resname: String,
    pub chain_id: String,
    pub resseq: i64,
    pub icode: char,
    pub segid: String,
    pub element: String,
    pub charge: String,
}

impl Default for AtomLabels {
    fn default() -> Self {
        Self {
            serial: 0,
            name: AtomName::default(),
            altloc: ' ',
            resname: String::new(),
            chain_id: String::new(),
            resseq: 0,
            icode: ' ',
            segid: String::new(),
            element: String::new(),
            charge: String::new(),
        }
    }
}

impl AtomLabels {
    fn parse(line: &str, kind: RecordKind) -> Result<Self, RecordError> {
        use atom_columns::*;
        Ok(Self {
            serial: read_hybrid36(line, &SERIAL, kind)?,
            name: AtomName::from_slot(&raw_field(line, &NAME)),
            altloc: read_char(line, &ALTLOC),
            resname: read_text(line, &RESNAME),
            chain_id: read_text(line, &CHAIN_ID),
            resseq: read_hybrid36(line, &RESSEQ, kind)?,
            icode: read_char(line, &ICODE),
            segid: read_text(line, &SEGID),
            element: read_text(line, &ELEMENT),
            charge: read_text(line, &CHARGE),
        })
    }

    fn write(&self, w: &mut LineWriter) -> Result<(), RecordError> {
        use atom_columns::*;
        w.hybrid36(&SERIAL, self.serial)?;
        w.text(&NAME, self.name.slot())
            .char(&ALTLOC, self.altloc)
            .text(&RESNAME, &self.resname)
            .text(&CHAIN_ID, &self.chain_id);
        w.hybrid36(&RESSEQ, self.resseq)?;
        w.char(&ICODE, self.icode)
            .text(&SEGID, &self.segid)
            .text(&ELEMENT, &self.element)
            .text(&CHARGE, &self.charge);
        Ok(())
    }

    /// Whether two label sets name the same atom, ignoring serial and the
    /// trailing segid/element/charge columns.
    pub fn same_atom(&self, other: &AtomLabels) -> bool {
        self.name == other.name
            && self.altloc == other.altloc
            && self.resname == other.resname
            && self.chain_id == other.chain_id
            && self.resseq == other.resseq
            && self.icode == other.icode
    }
}

/// A parsed ATOM or HETATM record.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomRecord {
    pub hetero: bool,
    pub labels: AtomLabels,
    pub position: Point3<f64>,
    pub occupancy: f64,
    pub b_iso: f64,
}

impl AtomRecord {
    pub fn parse(line: &str) -> Result<Self, RecordError> {
        use atom_columns::*;
        let kind = RecordKind::classify(line);
        if !kind.is_atom() {
            return Err(RecordError::WrongKind {
                expected: RecordKind::Atom,
                line: line.to_string(),
            });
        }
        Ok(Self {
            hetero: kind == RecordKind::Hetatm,
            labels: AtomLabels::parse(line, kind)?,
            position: Point3::new(
                read_real(line, &X, kind)?,
                read_real(line, &Y, kind)?,
                read_real(line, &Z, kind)?,
            ),
            occupancy: read_real(line, &OCCUPANCY, kind)?,
            b_iso: read_real(line, &TEMP_FACTOR, kind)?,
        })
    }

    pub fn format(&self) -> Result<String, RecordError> {
        use atom_columns::*;
        let (kind, keyword) = if self.hetero {
            (RecordKind::Hetatm, "HETATM")
        } else {
            (RecordKind::Atom, "ATOM")
        };
        let mut w = LineWriter::new(kind, keyword);
        self.labels.write(&mut w)?;
        w.real(&X, self.position.x)?;
        w.real(&Y, self.position.y)?;
        w.real(&Z, self.position.z)?;
        w.real(&OCCUPANCY, self.occupancy)?;
        w.real(&TEMP_FACTOR, self.b_iso)?;
        Ok(w.finish())
    }
}

/// A parsed ANISOU record. `u` holds the raw integers (U * 10^4) in the order
/// U11, U22, U33, U12, U13, U23.
#[derive(Debug, Clone, PartialEq)]
pub struct AnisouRecord {
    pub labels: AtomLabels,
    pub u: [i64; 6],
}

impl AnisouRecord {
    pub fn parse(line: &str) -> Result<Self, RecordError> {
        let kind = RecordKind::Anisou;
        if RecordKind::classify(line) != kind {
            return Err(RecordError::WrongKind {
                expected: kind,
                line: line.to_string(),
            });
        }
        let mut u = [0_i64; 6];
        for (value, spec) in u.iter_mut().zip(atom_columns::U.iter()) {
            *value = read_int(line, spec, kind)?;
        }
        Ok(Self {
            labels: AtomLabels::parse(line, kind)?,
            u,
        })
    }

    pub fn format(&self) -> Result<String, RecordError> {
        let mut w = LineWriter::new(RecordKind::Anisou, "ANISOU");
        self.labels.write(&mut w)?;
        for (value, spec) in self.u.iter().zip(atom_columns::U.iter()) {
            w.int(spec, *value)?;
        }
        Ok(w.finish())
    }

    /// Converts real-valued U (in square Angstroms) to the record integers.
    pub fn u_from_real(uij: &[f64; 6]) -> [i64; 6] {
        uij.map(|v| (v * 1.0e4).round() as i64)
    }

    pub fn u_as_real(&self) -> [f64; 6] {
        self.u.map(|v| v as f64 * 1.0e-4)
    }
}

/// A parsed CRYST1 record.
#[derive(Debug, Clone, PartialEq)]
pub struct Cryst1Record {
    /// a, b, c (Angstroms), alpha, beta, gamma (degrees).
    pub cell: [f64; 6],
    pub space_group: String,
    pub z: Option<i64>,
}

impl Cryst1Record {
    pub fn parse(line: &str) -> Result<Self, RecordError> {
        use cryst1_columns::*;
        let kind = RecordKind::Cryst1;
        if RecordKind::classify(line) != kind {
            return Err(RecordError::WrongKind {
                expected: kind,
                line: line.to_string(),
            });
        }
        let mut cell = [0.0; 6];
        for (value, spec) in cell.iter_mut().zip(CELL.iter()) {
            *value = read_real(line, spec, kind)?;
        }
        Ok(Self {
            cell,
            space_group: read_text(line, &SPACE_GROUP),
            z: read_optional_int(line, &Z, kind)?,
        })
    }

    pub fn format(&self) -> Result<String, RecordError> {
        use cryst1_columns::*;
        let mut w = LineWriter::new(RecordKind::Cryst1, "CRYST1");
        for (value, spec) in self.cell.iter().zip(CELL.iter()) {
            w.real(spec, *value)?;
        }
        w.text(&SPACE_GROUP, &self.space_group);
        if let Some(z) = self.z {
            // Z wider than its columns keeps its leading digits.
            w.text(&Z, &z.to_string());
        }
        Ok(w.finish())
    }
}

/// One of the three SCALEn records.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleRecord {
    /// 1, 2 or 3.
    pub row: u8,
    pub matrix_row: [f64; 3],
    pub translation: f64,
}

impl ScaleRecord {
    pub fn parse(line: &str) -> Result<Self, RecordError> {
        use scale_columns::*;
        let kind = RecordKind::classify(line);
        let RecordKind::Scale(row) = kind else {
            return Err(RecordError::WrongKind {
                expected: RecordKind::Scale(1),
                line: line.to_string(),
            });
        };
        let mut matrix_row = [0.0; 3];
        for (value, spec) in matrix_row.iter_mut().zip(ROW.iter()) {
            *value = read_real(line, spec, kind)?;
        }
        Ok(Self {
            row,
            matrix_row,
            translation: read_real(line, &TRANSLATION, kind)?,
        })
    }

    pub fn format(&self) -> Result<String, RecordError> {
        use scale_columns::*;
        let kind = RecordKind::Scale(self.row);
        let mut w = LineWriter::new(kind, &format!("SCALE{}", self.row));
        for (value, spec) in self.matrix_row.iter().zip(ROW.iter()) {
            w.real(spec, *value)?;
        }
        w.real(&TRANSLATION, self.translation)?;
        Ok(w.finish().replace(" -0.000000", "  0.000000"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRecord {
    pub id: String,
}

impl ModelRecord {
    pub fn parse(line: &str) -> Self {
        Self {
            id: read_text(line, &MODEL_ID),
        }
    }

    pub fn format(&self) -> String {
        let mut w = LineWriter::new(RecordKind::Model, "MODEL");
        w.text(&MODEL_ID, &self.id);
        w.finish()
    }
}

/// A single line resolved into its typed form.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Atom(AtomRecord),
    Anisou(AnisouRecord),
    Cryst1(Cryst1Record),
    Scale(ScaleRecord),
    Model(ModelRecord),
    Endmdl,
    Ter,
    Break,
    End,
    /// Records without typed fields, carried verbatim.
    Raw(RecordKind, String),
}

impl Record {
    /// Parses `line` as a record of `kind`, as returned by
    /// [`RecordKind::classify`].
    pub fn parse(line: &str, kind: RecordKind) -> Result<Self, RecordError> {
        Ok(match kind {
            RecordKind::Atom | RecordKind::Hetatm => Self::Atom(AtomRecord::parse(line)?),
            RecordKind::Anisou => Self::Anisou(AnisouRecord::parse(line)?),
            RecordKind::Cryst1 => Self::Cryst1(Cryst1Record::parse(line)?),
            RecordKind::Scale(_) => Self::Scale(ScaleRecord::parse(line)?),
            RecordKind::Model => Self::Model(ModelRecord::parse(line)),
            RecordKind::Endmdl => Self::Endmdl,
            RecordKind::Ter => Self::Ter,
            RecordKind::Break => Self::Break,
            RecordKind::End => Self::End,
            other => Self::Raw(other, line.trim_end().to_string()),
        })
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Atom(a) if a.hetero => RecordKind::Hetatm,
            Self::Atom(_) => RecordKind::Atom,
            Self::Anisou(_) => RecordKind::Anisou,
            Self::Cryst1(_) => RecordKind::Cryst1,
            Self::Scale(s) => RecordKind::Scale(s.row),
            Self::Model(_) => RecordKind::Model,
            Self::Endmdl => RecordKind::Endmdl,
            Self::Ter => RecordKind::Ter,
            Self::Break => RecordKind::Break,
            Self::End => RecordKind::End,
            Self::Raw(kind, _) => *kind,
        }
    }

    pub fn format(&self) -> Result<String, RecordError> {
        match self {
            Self::Atom(a) => a.format(),
            Self::Anisou(a) => a.format(),
            Self::Cryst1(c) => c.format(),
            Self::Scale(s) => s.format(),
            Self::Model(m) => Ok(m.format()),
            Self::Endmdl => Ok("ENDMDL".to_string()),
            Self::Ter => Ok("TER".to_string()),
            Self::Break => Ok("BREAK".to_string()),
            Self::End => Ok("END".to_string()),
            Self::Raw(_, line) => Ok(line.clone()),
        }
    }
}
