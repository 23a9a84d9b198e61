use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use crate::atom::Chirality;
use crate::element::Element;
use crate::mol::Mol;
use crate::stereo::StereocenterKind;

use super::error::SmartsError;
use super::query::{AtomExpr, BondExpr};

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    input: &'a str,
    ignore_direction_mismatch: bool,
    /// Position of the `:` of the current bracket atom's map class suffix.
    map_suffix: Option<usize>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, ignore_direction_mismatch: bool) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            input,
            ignore_direction_mismatch,
            map_suffix: None,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn parse_number(&mut self) -> Option<u32> {
        let start = self.pos;
        let mut value: u32 = 0;
        while let Some(d) = self.peek().and_then(|c| c.to_digit(10)) {
            value = value.saturating_mul(10).saturating_add(d);
            self.pos += 1;
        }
        (self.pos > start).then_some(value)
    }

    fn parse_count(&mut self, default: u32) -> u8 {
        self.parse_number()
            .unwrap_or(default)
            .try_into()
            .unwrap_or(u8::MAX)
    }

    fn parse_smarts(&mut self) -> Result<Mol<AtomExpr, BondExpr>, SmartsError> {
        let mut mol = Mol::new();
        let mut stack: Vec<(NodeIndex, Option<BondExpr>)> = Vec::new();
        let mut current: Option<NodeIndex> = None;
        let mut pending_bond: Option<BondExpr> = None;
        let mut ring_map: HashMap<u16, (NodeIndex, Option<BondExpr>)> = HashMap::new();

        while let Some(ch) = self.peek() {
            match ch {
                '(' => {
                    self.pos += 1;
                    let cur = current.ok_or(SmartsError::UnmatchedParen { pos: self.pos - 1 })?;
                    stack.push((cur, pending_bond.take()));
                }
                ')' => {
                    self.pos += 1;
                    let (prev, saved_bond) = stack
                        .pop()
                        .ok_or(SmartsError::UnmatchedParen { pos: self.pos - 1 })?;
                    current = Some(prev);
                    pending_bond = saved_bond;
                }
                '.' => {
                    self.pos += 1;
                    current = None;
                    pending_bond = None;
                }
                '-' | '=' | '#' | '~' | ':' | '/' | '\\' | '@' => {
                    if pending_bond.is_some() {
                        return Err(SmartsError::InvalidSmarts {
                            pos: self.pos,
                            msg: "consecutive bond expressions".into(),
                        });
                    }
                    pending_bond = Some(self.parse_bond_expr()?);
                }
                '0'..='9' | '%' => {
                    let pos = self.pos;
                    let digit = self.parse_ring_closure()?;
                    let cur = current.ok_or_else(|| SmartsError::InvalidSmarts {
                        pos,
                        msg: "ring closure without preceding atom".into(),
                    })?;
                    let written = pending_bond.take();
                    if let Some((other, open_bond)) = ring_map.remove(&digit) {
                        let bond = self.merge_ring_bonds(open_bond, written, digit)?;
                        mol.add_bond(other, cur, bond.unwrap_or(BondExpr::SingleOrAromatic));
                    } else {
                        ring_map.insert(digit, (cur, written));
                    }
                }
                _ => {
                    let atom_expr = if ch == '[' {
                        self.parse_bracket_atom()?
                    } else {
                        self.parse_bare_atom()?
                    };
                    let idx = mol.add_atom(atom_expr);
                    let bond = pending_bond.take();
                    if let Some(prev) = current {
                        mol.add_bond(prev, idx, bond.unwrap_or(BondExpr::SingleOrAromatic));
                    }
                    current = Some(idx);
                }
            }
        }

        if !stack.is_empty() {
            return Err(SmartsError::UnmatchedParen { pos: self.pos });
        }

        if let Some(&digit) = ring_map.keys().min() {
            return Err(SmartsError::UnclosedRing { digit });
        }

        let chiral: Vec<NodeIndex> = mol.atoms().filter(|&a| mol.atom(a).has_chirality()).collect();
        for atom in chiral {
            mol.stereocenters_mut()
                .add(atom, StereocenterKind::Absolute, 0);
        }

        Ok(mol)
    }

    fn merge_ring_bonds(
        &self,
        open: Option<BondExpr>,
        close: Option<BondExpr>,
        digit: u16,
    ) -> Result<Option<BondExpr>, SmartsError> {
        match (open, close) {
            (None, None) => Ok(None),
            (Some(b), None) | (None, Some(b)) => Ok(Some(b)),
            (Some(b1), Some(b2)) if b1 == b2 => Ok(Some(b1)),
            (Some(b1 @ (BondExpr::Up | BondExpr::Down)), Some(BondExpr::Up | BondExpr::Down))
                if self.ignore_direction_mismatch =>
            {
                Ok(Some(b1))
            }
            _ => Err(SmartsError::RingBondConflict { digit }),
        }
    }

    fn parse_ring_closure(&mut self) -> Result<u16, SmartsError> {
        let start = self.pos;
        if self.peek() == Some('%') {
            self.pos += 1;
            match (
                self.peek().and_then(|c| c.to_digit(10)),
                self.peek_at(1).and_then(|c| c.to_digit(10)),
            ) {
                (Some(d1), Some(d2)) => {
                    self.pos += 2;
                    Ok((d1 * 10 + d2) as u16)
                }
                _ => Err(SmartsError::InvalidSmarts {
                    pos: start,
                    msg: "expected two digits after %".into(),
                }),
            }
        } else {
            let ch = self.chars[start];
            let d = ch
                .to_digit(10)
                .ok_or(SmartsError::UnexpectedChar { pos: start, ch })?;
            self.pos += 1;
            Ok(d as u16)
        }
    }

    fn parse_bond_expr(&mut self) -> Result<BondExpr, SmartsError> {
        let pos = self.pos;
        let ch = self.peek().ok_or_else(|| SmartsError::InvalidSmarts {
            pos,
            msg: "expected bond".into(),
        })?;
        self.pos += 1;
        match ch {
            '-' => Ok(BondExpr::Single),
            '=' => Ok(BondExpr::Double),
            '#' => Ok(BondExpr::Triple),
            '~' => Ok(BondExpr::True),
            ':' => Ok(BondExpr::Aromatic),
            '/' => Ok(BondExpr::Up),
            '\\' => Ok(BondExpr::Down),
            '@' => Ok(BondExpr::Ring),
            _ => Err(SmartsError::UnexpectedChar { pos, ch }),
        }
    }

    fn parse_bare_atom(&mut self) -> Result<AtomExpr, SmartsError> {
        let start = self.pos;
        let ch = self.chars[self.pos];

        match ch {
            '*' => {
                self.pos += 1;
                return Ok(AtomExpr::True);
            }
            'A' if !self.peek_at(1).is_some_and(|c| c.is_ascii_lowercase()) => {
                self.pos += 1;
                return Ok(AtomExpr::Aliphatic);
            }
            'a' => {
                self.pos += 1;
                return Ok(AtomExpr::Aromatic);
            }
            _ => {}
        }

        self.parse_bare_element()
            .map_err(|_| SmartsError::UnexpectedChar { pos: start, ch })
    }

    fn parse_bare_element(&mut self) -> Result<AtomExpr, SmartsError> {
        let start = self.pos;
        let ch = self.chars[self.pos];

        const AROMATIC: &[(char, u8)] = &[('b', 5), ('c', 6), ('n', 7), ('o', 8), ('s', 16), ('p', 15)];
        if let Some(&(_, num)) = AROMATIC.iter().find(|(sym, _)| *sym == ch) {
            self.pos += 1;
            return Ok(AtomExpr::Element {
                atomic_num: num,
                aromatic: Some(true),
            });
        }

        if ch.is_ascii_uppercase() {
            if let Some(expr) = self.parse_uppercase_symbol() {
                return Ok(expr);
            }
        }

        Err(SmartsError::UnexpectedChar { pos: start, ch })
    }

    /// Longest-match element symbol starting with an uppercase letter.
    fn parse_uppercase_symbol(&mut self) -> Option<AtomExpr> {
        let first = self.peek()?;
        if let Some(second) = self.peek_at(1).filter(|c| c.is_ascii_lowercase()) {
            if let Some(elem) = Element::from_symbol(&format!("{first}{second}")) {
                self.pos += 2;
                return Some(aliphatic(elem));
            }
        }
        let elem = Element::from_symbol(&first.to_string())?;
        self.pos += 1;
        Some(aliphatic(elem))
    }

    fn parse_bracket_atom(&mut self) -> Result<AtomExpr, SmartsError> {
        let bracket_start = self.pos;
        self.pos += 1; // '['

        self.map_suffix = self.find_map_suffix();
        let expr = self.parse_semicolon_expr();
        let suffix = self.map_suffix.take();
        let mut expr = expr?;

        // `[C,N:1]` maps the whole atom, not the last alternative
        if suffix == Some(self.pos) {
            self.pos += 1;
            if let Some(class) = self.parse_number() {
                expr = expr.and(AtomExpr::AtomMapClass(class));
            }
        }

        if self.peek() != Some(']') {
            return Err(SmartsError::UnclosedBracket { pos: bracket_start });
        }
        self.pos += 1;

        Ok(expr)
    }

    /// Finds a `:digits` run that ends the bracket atom starting at `pos`.
    fn find_map_suffix(&self) -> Option<usize> {
        let mut depth = 0usize;
        let mut end = None;
        for (i, &c) in self.chars.iter().enumerate().skip(self.pos) {
            match c {
                '(' => depth += 1,
                ')' => depth = depth.saturating_sub(1),
                ']' if depth == 0 => {
                    end = Some(i);
                    break;
                }
                _ => {}
            }
        }
        let end = end?;
        let digits = self.chars[self.pos..end]
            .iter()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .count();
        let colon = end.checked_sub(digits + 1)?;
        (digits > 0 && colon >= self.pos && self.chars[colon] == ':').then_some(colon)
    }

    fn parse_semicolon_expr(&mut self) -> Result<AtomExpr, SmartsError> {
        let mut parts = vec![self.parse_comma_expr()?];
        while self.peek() == Some(';') {
            self.pos += 1;
            parts.push(self.parse_comma_expr()?);
        }
        Ok(flatten_and(parts))
    }

    fn parse_comma_expr(&mut self) -> Result<AtomExpr, SmartsError> {
        let mut parts = vec![self.parse_high_and_expr()?];
        while self.peek() == Some(',') {
            self.pos += 1;
            parts.push(self.parse_high_and_expr()?);
        }
        Ok(flatten_or(parts))
    }

    fn parse_high_and_expr(&mut self) -> Result<AtomExpr, SmartsError> {
        let mut parts = Vec::new();
        while let Some(ch) = self.peek() {
            if self.map_suffix == Some(self.pos) {
                break;
            }
            match ch {
                ']' | ',' | ';' => break,
                '&' => self.pos += 1,
                _ => parts.push(self.parse_not_expr()?),
            }
        }
        if parts.is_empty() {
            Ok(AtomExpr::True)
        } else {
            Ok(flatten_and(parts))
        }
    }

    fn parse_not_expr(&mut self) -> Result<AtomExpr, SmartsError> {
        if self.peek() == Some('!') {
            self.pos += 1;
            let inner = self.parse_not_expr()?;
            Ok(AtomExpr::Not(Box::new(inner)))
        } else {
            self.parse_primitive()
        }
    }

    fn parse_primitive(&mut self) -> Result<AtomExpr, SmartsError> {
        let ch = self.peek().ok_or_else(|| SmartsError::InvalidSmarts {
            pos: self.pos,
            msg: "expected atom primitive".into(),
        })?;

        match ch {
            '*' => {
                self.pos += 1;
                Ok(AtomExpr::True)
            }
            'A' if !self.peek_at(1).is_some_and(|c| c.is_ascii_lowercase()) => {
                self.pos += 1;
                Ok(AtomExpr::Aliphatic)
            }
            'a' if self.peek_at(1) != Some('s') => {
                self.pos += 1;
                Ok(AtomExpr::Aromatic)
            }
            '#' => {
                self.pos += 1;
                let num = self
                    .parse_number()
                    .ok_or(SmartsError::InvalidAtomicNum { pos: self.pos })?;
                match u8::try_from(num) {
                    Ok(n @ 1..=118) => Ok(AtomExpr::Element {
                        atomic_num: n,
                        aromatic: None,
                    }),
                    _ => Err(SmartsError::InvalidAtomicNum { pos: self.pos }),
                }
            }
            'D' => {
                self.pos += 1;
                Ok(AtomExpr::Degree(self.parse_count(1)))
            }
            'v' => {
                self.pos += 1;
                Ok(AtomExpr::Valence(self.parse_count(1)))
            }
            'X' => {
                self.pos += 1;
                Ok(AtomExpr::Connectivity(self.parse_count(1)))
            }
            'H' if self.is_hydrogen_element_context() => {
                self.pos += 1;
                Ok(aliphatic(Element::H))
            }
            'H' => {
                self.pos += 1;
                Ok(AtomExpr::TotalHCount(self.parse_count(1)))
            }
            'h' => {
                self.pos += 1;
                Ok(AtomExpr::ImplicitHCount(self.parse_count(1)))
            }
            'R' => {
                self.pos += 1;
                Ok(match self.parse_number() {
                    Some(0) => AtomExpr::NotInRing,
                    Some(n) => AtomExpr::RingMembership(n.try_into().unwrap_or(u8::MAX)),
                    None => AtomExpr::InRing,
                })
            }
            'r' => {
                self.pos += 1;
                Ok(match self.parse_number() {
                    Some(n) => AtomExpr::SmallestRingSize(n.try_into().unwrap_or(u8::MAX)),
                    None => AtomExpr::InRing,
                })
            }
            'x' => {
                self.pos += 1;
                Ok(AtomExpr::RingBondCount(self.parse_count(1)))
            }
            '@' => {
                self.pos += 1;
                if self.peek() == Some('@') {
                    self.pos += 1;
                    Ok(AtomExpr::Chirality(Chirality::Cw))
                } else {
                    Ok(AtomExpr::Chirality(Chirality::Ccw))
                }
            }
            '+' | '-' => self.parse_charge(ch),
            ':' => {
                let pos = self.pos;
                self.pos += 1;
                self.parse_number()
                    .map(AtomExpr::AtomMapClass)
                    .ok_or_else(|| SmartsError::InvalidSmarts {
                        pos,
                        msg: "expected atom map class".into(),
                    })
            }
            '$' => self.parse_recursive(),
            _ if ch.is_ascii_digit() => {
                let n = self.parse_number().unwrap_or(0);
                Ok(AtomExpr::Isotope(n.try_into().unwrap_or(u16::MAX)))
            }
            _ if ch.is_ascii_alphabetic() => self.parse_bracket_element(),
            _ => Err(SmartsError::UnexpectedChar { pos: self.pos, ch }),
        }
    }

    /// `+`, `++`, `+2`; likewise for `-`.
    fn parse_charge(&mut self, sign_char: char) -> Result<AtomExpr, SmartsError> {
        let sign: i8 = if sign_char == '+' { 1 } else { -1 };
        self.pos += 1;
        let magnitude = match self.parse_number() {
            Some(n) => i8::try_from(n).map_err(|_| SmartsError::InvalidSmarts {
                pos: self.pos,
                msg: "charge out of range".into(),
            })?,
            None => {
                let mut count = 1i8;
                while self.peek() == Some(sign_char) {
                    self.pos += 1;
                    count = count.saturating_add(1);
                }
                count
            }
        };
        Ok(AtomExpr::Charge(sign * magnitude))
    }

    fn parse_recursive(&mut self) -> Result<AtomExpr, SmartsError> {
        self.pos += 1; // '$'
        if self.peek() != Some('(') {
            return Err(SmartsError::UnclosedRecursive { pos: self.pos });
        }
        self.pos += 1;
        let inner = self.extract_balanced_parens()?;
        let inner_mol = parse(inner, false)?;
        Ok(AtomExpr::Recursive(Box::new(inner_mol)))
    }

    /// `H` is the element when it is the whole bracket content, e.g. `[H]`.
    fn is_hydrogen_element_context(&self) -> bool {
        self.peek_at(1) == Some(']') && self.pos > 0 && self.chars[self.pos - 1] == '['
    }

    fn parse_bracket_element(&mut self) -> Result<AtomExpr, SmartsError> {
        let start = self.pos;
        let ch = self.chars[self.pos];

        const AROMATIC: &[(&str, u8)] = &[
            ("se", 34),
            ("as", 33),
            ("te", 52),
            ("b", 5),
            ("c", 6),
            ("n", 7),
            ("o", 8),
            ("s", 16),
            ("p", 15),
        ];

        if ch.is_ascii_lowercase() {
            for &(sym, num) in AROMATIC {
                if self.matches_str(sym) {
                    self.pos += sym.len();
                    return Ok(AtomExpr::Element {
                        atomic_num: num,
                        aromatic: Some(true),
                    });
                }
            }
            return Err(SmartsError::UnexpectedChar { pos: start, ch });
        }

        self.parse_uppercase_symbol()
            .ok_or(SmartsError::UnexpectedChar { pos: start, ch })
    }

    fn matches_str(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn extract_balanced_parens(&mut self) -> Result<&'a str, SmartsError> {
        let input = self.input;
        let start_pos = self.pos;
        let begin_byte: usize = self.chars[..self.pos].iter().map(|c| c.len_utf8()).sum();
        let mut depth = 1;

        while let Some(ch) = self.peek() {
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        let len: usize = self.chars[start_pos..self.pos]
                            .iter()
                            .map(|c| c.len_utf8())
                            .sum();
                        self.pos += 1;
                        return Ok(&input[begin_byte..begin_byte + len]);
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }

        Err(SmartsError::UnclosedRecursive { pos: start_pos })
    }
}

fn aliphatic(elem: Element) -> AtomExpr {
    AtomExpr::Element {
        atomic_num: elem.atomic_num(),
        aromatic: Some(false),
    }
}

fn flatten_and(parts: Vec<AtomExpr>) -> AtomExpr {
    let mut flattened = Vec::new();
    for p in parts {
        match p {
            AtomExpr::And(inner) => flattened.extend(inner),
            other => flattened.push(other),
        }
    }
    if flattened.len() == 1 {
        flattened.remove(0)
    } else {
        AtomExpr::And(flattened)
    }
}

fn flatten_or(parts: Vec<AtomExpr>) -> AtomExpr {
    let mut flattened = Vec::new();
    for p in parts {
        match p {
            AtomExpr::Or(inner) => flattened.extend(inner),
            other => flattened.push(other),
        }
    }
    if flattened.len() == 1 {
        flattened.remove(0)
    } else {
        AtomExpr::Or(flattened)
    }
}

/// Parses trimmed, non-empty SMARTS text into a query graph.
pub fn parse(
    input: &str,
    ignore_direction_mismatch: bool,
) -> Result<Mol<AtomExpr, BondExpr>, SmartsError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SmartsError::EmptyInput);
    }
    Parser::new(trimmed, ignore_direction_mismatch).parse_smarts()
}
