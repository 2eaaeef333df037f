//! Text protocol spoken with the game engine.
//!
//! Input is a stream of whitespace separated integers. Line breaks carry no
//! meaning, so everything goes through a `TokenReader`. Output is two lines
//! per tick: the queen command and the TRAIN command.

use crate::error::*;
use crate::location::*;
use crate::policy::*;
use crate::world::*;
use itertools::Itertools;
use log::*;
use std::collections::VecDeque;
use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

pub struct TokenReader<R> {
    reader: R,
    tokens: VecDeque<String>,
}

impl<R: BufRead> TokenReader<R> {
    pub fn new(reader: R) -> Self {
        TokenReader {
            reader,
            tokens: VecDeque::new(),
        }
    }

    /// Reads lines until a token is buffered. Returns false at end of input.
    fn fill(&mut self) -> Result<bool, ProtocolError> {
        while self.tokens.is_empty() {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(false);
            }
            self.tokens
                .extend(line.split_whitespace().map(|token| token.to_string()));
        }
        Ok(true)
    }

    /// True once the input holds nothing but whitespace.
    pub fn at_end(&mut self) -> Result<bool, ProtocolError> {
        Ok(!self.fill()?)
    }

    pub fn next<T: FromStr>(&mut self, expected: &'static str) -> Result<T, ProtocolError> {
        if !self.fill()? {
            return Err(ProtocolError::UnexpectedEof { expected });
        }
        let token = self
            .tokens
            .pop_front()
            .ok_or(ProtocolError::UnexpectedEof { expected })?;
        match token.parse::<T>() {
            Ok(value) => Ok(value),
            Err(_) => Err(ProtocolError::InvalidToken { expected, token }),
        }
    }
}

fn parse_site_id(value: i32) -> Result<SiteId, ProtocolError> {
    u32::try_from(value)
        .map(SiteId)
        .map_err(|_| ProtocolError::UnknownSite(value as i64))
}

fn parse_owner(value: i32) -> Result<Option<Owner>, ProtocolError> {
    match value {
        -1 => Ok(None),
        0 => Ok(Some(Owner::Hero)),
        1 => Ok(Some(Owner::Enemy)),
        other => Err(ProtocolError::UnknownOwner(other as i64)),
    }
}

fn parse_unit_kind(value: i32) -> Result<UnitKind, ProtocolError> {
    match value {
        -1 => Ok(UnitKind::Queen),
        0 => Ok(UnitKind::Knight),
        1 => Ok(UnitKind::Archer),
        2 => Ok(UnitKind::Giant),
        other => Err(ProtocolError::UnknownUnitType(other as i64)),
    }
}

fn parse_structure(
    structure_type: i32,
    param1: i32,
    param2: i32,
) -> Result<Option<StructureKind>, ProtocolError> {
    match structure_type {
        -1 => Ok(None),
        0 => Ok(Some(StructureKind::Mine {
            income_rate: param1,
        })),
        1 => Ok(Some(StructureKind::Tower {
            health: param1,
            attack_radius: param2,
        })),
        2 => {
            let unit = parse_unit_kind(param2)?;
            if unit == UnitKind::Queen {
                return Err(ProtocolError::UnknownUnitType(param2 as i64));
            }
            Ok(Some(StructureKind::barracks(unit, param1)))
        }
        other => Err(ProtocolError::UnknownStructureType(other as i64)),
    }
}

/// Reads the startup site list.
pub fn read_layout<R: BufRead>(
    reader: &mut TokenReader<R>,
) -> Result<Vec<SiteLayout>, ProtocolError> {
    let count: usize = reader.next("site count")?;
    let mut layout = Vec::with_capacity(count);

    for _ in 0..count {
        let id = parse_site_id(reader.next("site id")?)?;
        let x: i32 = reader.next("site x")?;
        let y: i32 = reader.next("site y")?;
        let radius: i32 = reader.next("site radius")?;

        layout.push(SiteLayout {
            id,
            location: Location::new(x, y),
            radius,
        });
    }

    Ok(layout)
}

/// Reads one tick. Returns `None` when the input ends cleanly before it.
pub fn read_tick<R: BufRead>(
    reader: &mut TokenReader<R>,
    site_count: usize,
) -> Result<Option<TickSnapshot>, ProtocolError> {
    if reader.at_end()? {
        return Ok(None);
    }

    let gold: i32 = reader.next("gold")?;
    let touched: i32 = reader.next("touched site")?;
    let touched_site = if touched < 0 {
        None
    } else {
        Some(parse_site_id(touched)?)
    };

    let mut sites = Vec::with_capacity(site_count);
    for _ in 0..site_count {
        let id = parse_site_id(reader.next("site id")?)?;
        let gold_remaining: i32 = reader.next("gold remaining")?;
        let max_gold_rate: i32 = reader.next("max gold rate")?;
        let structure_type: i32 = reader.next("structure type")?;
        let owner_value: i32 = reader.next("structure owner")?;
        let param1: i32 = reader.next("param1")?;
        let param2: i32 = reader.next("param2")?;

        let owner = parse_owner(owner_value)?;
        let structure = match (parse_structure(structure_type, param1, param2)?, owner) {
            (Some(kind), Some(owner)) => Some((owner, kind)),
            (Some(_), None) => return Err(ProtocolError::UnknownOwner(owner_value as i64)),
            (None, Some(owner)) => {
                warn!("Site {} has owner {:?} but no structure", id, owner);
                None
            }
            (None, None) => None,
        };

        sites.push(SiteSnapshot {
            id,
            gold_remaining,
            max_gold_rate,
            structure,
        });
    }

    let unit_count: usize = reader.next("unit count")?;
    let mut units = Vec::with_capacity(unit_count);
    for _ in 0..unit_count {
        let x: i32 = reader.next("unit x")?;
        let y: i32 = reader.next("unit y")?;
        let owner_value: i32 = reader.next("unit owner")?;
        let kind = parse_unit_kind(reader.next("unit type")?)?;
        let health: i32 = reader.next("unit health")?;

        let owner = parse_owner(owner_value)?
            .ok_or(ProtocolError::UnknownOwner(owner_value as i64))?;

        units.push(Unit {
            location: Location::new(x, y),
            owner,
            kind,
            health,
        });
    }

    Ok(Some(TickSnapshot {
        gold,
        touched_site,
        sites,
        units,
    }))
}

impl fmt::Display for BuildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildKind::Mine => write!(f, "MINE"),
            BuildKind::Tower => write!(f, "TOWER"),
            BuildKind::BarracksKnight => write!(f, "BARRACKS-KNIGHT"),
            BuildKind::BarracksArcher => write!(f, "BARRACKS-ARCHER"),
        }
    }
}

impl fmt::Display for QueenAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueenAction::Build { site, kind } => write!(f, "BUILD {} {}", site, kind),
            QueenAction::Move { to } => write!(f, "MOVE {} {}", to.x(), to.y()),
            QueenAction::Wait => write!(f, "WAIT"),
        }
    }
}

impl fmt::Display for TrainOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sites.is_empty() {
            write!(f, "TRAIN")
        } else {
            write!(f, "TRAIN {}", self.sites.iter().join(" "))
        }
    }
}

/// Writes both command lines for a tick and flushes them.
pub fn write_turn<W: Write>(
    output: &mut W,
    queen: &QueenAction,
    train: &TrainOrder,
) -> Result<(), ProtocolError> {
    writeln!(output, "{}", queen)?;
    writeln!(output, "{}", train)?;
    output.flush()?;
    Ok(())
}
