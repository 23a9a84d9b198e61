use crate::element::Element;
use crate::smiles::error::SmilesError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Atom(AtomToken),
    Bond(BondToken),
    RingClosure {
        bond: Option<BondToken>,
        digit: u16,
        pos: usize,
    },
    OpenParen(usize),
    CloseParen(usize),
    Dot(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomToken {
    /// `None` for the `*` wildcard.
    pub element: Option<Element>,
    pub is_aromatic: bool,
    pub isotope: u16,
    pub chirality: ChiralityToken,
    pub hcount: Option<u8>,
    pub charge: i8,
    pub atom_class: u32,
    pub is_bracket: bool,
    pub pos: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChiralityToken {
    None,
    CounterClockwise,
    Clockwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondToken {
    Single,
    Double,
    Triple,
    Aromatic,
    Up,
    Down,
}

impl BondToken {
    pub fn is_directional(self) -> bool {
        matches!(self, BondToken::Up | BondToken::Down)
    }
}

pub fn tokenize(input: &str) -> Result<Vec<Token>, SmilesError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let bond = match chars[i] {
            '-' => Some(BondToken::Single),
            '=' => Some(BondToken::Double),
            '#' => Some(BondToken::Triple),
            ':' => Some(BondToken::Aromatic),
            '/' => Some(BondToken::Up),
            '\\' => Some(BondToken::Down),
            _ => None,
        };
        if let Some(b) = bond {
            tokens.push(Token::Bond(b));
            i += 1;
            continue;
        }

        match chars[i] {
            ' ' | '\t' | '\r' | '\n' => {
                i += 1;
            }
            '[' => {
                let (tok, next) = parse_bracket_atom(&chars, i)?;
                tokens.push(Token::Atom(tok));
                i = next;
            }
            '(' => {
                tokens.push(Token::OpenParen(i));
                i += 1;
            }
            ')' => {
                tokens.push(Token::CloseParen(i));
                i += 1;
            }
            '.' => {
                tokens.push(Token::Dot(i));
                i += 1;
            }
            '%' => {
                let (digit, next) = parse_percent_ring(&chars, i)?;
                let bond = try_consume_pending_bond(&mut tokens);
                tokens.push(Token::RingClosure { bond, digit, pos: i });
                i = next;
            }
            d @ '0'..='9' => {
                let bond = try_consume_pending_bond(&mut tokens);
                tokens.push(Token::RingClosure {
                    bond,
                    digit: (d as u16) - b'0' as u16,
                    pos: i,
                });
                i += 1;
            }
            ch => {
                let (element, aromatic, len) =
                    organic_atom(&chars, i).ok_or(SmilesError::UnexpectedChar { pos: i, ch })?;
                tokens.push(Token::Atom(bare_atom(element, aromatic, i)));
                i += len;
            }
        }
    }

    Ok(tokens)
}

/// Recognizes an organic-subset atom (or `*`) outside brackets.
/// Returns the element, aromaticity and the number of characters consumed.
fn organic_atom(chars: &[char], i: usize) -> Option<(Option<Element>, bool, usize)> {
    let next = chars.get(i + 1).copied();
    let found = match (chars[i], next) {
        ('*', _) => (None, false, 1),
        ('B', Some('r')) => (Some(Element::Br), false, 2),
        ('C', Some('l')) => (Some(Element::Cl), false, 2),
        ('B', _) => (Some(Element::B), false, 1),
        ('C', _) => (Some(Element::C), false, 1),
        ('N', _) => (Some(Element::N), false, 1),
        ('O', _) => (Some(Element::O), false, 1),
        ('P', _) => (Some(Element::P), false, 1),
        ('S', _) => (Some(Element::S), false, 1),
        ('F', _) => (Some(Element::F), false, 1),
        ('I', _) => (Some(Element::I), false, 1),
        ('b', _) => (Some(Element::B), true, 1),
        ('c', _) => (Some(Element::C), true, 1),
        ('n', _) => (Some(Element::N), true, 1),
        ('o', _) => (Some(Element::O), true, 1),
        ('p', _) => (Some(Element::P), true, 1),
        ('s', _) => (Some(Element::S), true, 1),
        _ => return None,
    };
    Some(found)
}

fn bare_atom(element: Option<Element>, aromatic: bool, pos: usize) -> AtomToken {
    AtomToken {
        element,
        is_aromatic: aromatic,
        isotope: 0,
        chirality: ChiralityToken::None,
        hcount: None,
        charge: 0,
        atom_class: 0,
        is_bracket: false,
        pos,
    }
}

fn try_consume_pending_bond(tokens: &mut Vec<Token>) -> Option<BondToken> {
    if let Some(Token::Bond(b)) = tokens.last().cloned() {
        tokens.pop();
        return Some(b);
    }
    None
}

fn parse_percent_ring(chars: &[char], start: usize) -> Result<(u16, usize), SmilesError> {
    let i = start + 1;
    match (chars.get(i).and_then(|c| c.to_digit(10)), chars.get(i + 1).and_then(|c| c.to_digit(10))) {
        (Some(d1), Some(d2)) => Ok(((d1 * 10 + d2) as u16, i + 2)),
        _ => Err(SmilesError::UnexpectedChar {
            pos: start,
            ch: '%',
        }),
    }
}

fn parse_bracket_atom(chars: &[char], start: usize) -> Result<(AtomToken, usize), SmilesError> {
    let mut i = start + 1; // skip '['

    let isotope = read_number(chars, &mut i)
        .map(|v| u16::try_from(v).map_err(|_| SmilesError::InvalidIsotope { pos: start }))
        .transpose()?
        .unwrap_or(0);

    let (element, is_aromatic) = parse_bracket_element(chars, &mut i, start)?;
    let chirality = parse_chirality(chars, &mut i);
    let hcount = parse_hcount(chars, &mut i);
    let charge = parse_charge(chars, &mut i, start)?;
    let atom_class = parse_atom_class(chars, &mut i, start)?;

    if chars.get(i) != Some(&']') {
        return Err(SmilesError::UnclosedBracket { pos: start });
    }
    i += 1;

    Ok((
        AtomToken {
            element,
            is_aromatic,
            isotope,
            chirality,
            hcount: Some(hcount.unwrap_or(0)),
            charge,
            atom_class,
            is_bracket: true,
            pos: start,
        },
        i,
    ))
}

/// Reads a run of decimal digits; `None` if there are none.
fn read_number(chars: &[char], i: &mut usize) -> Option<u64> {
    let start = *i;
    let mut val: u64 = 0;
    while let Some(d) = chars.get(*i).and_then(|c| c.to_digit(10)) {
        val = val.saturating_mul(10).saturating_add(d as u64);
        *i += 1;
    }
    (*i > start).then_some(val)
}

fn parse_bracket_element(
    chars: &[char],
    i: &mut usize,
    bracket_start: usize,
) -> Result<(Option<Element>, bool), SmilesError> {
    let Some(&first) = chars.get(*i) else {
        return Err(SmilesError::UnclosedBracket { pos: bracket_start });
    };

    if first == '*' {
        *i += 1;
        return Ok((None, false));
    }

    const AROMATIC: &[(&str, Element)] = &[
        ("se", Element::Se),
        ("te", Element::Te),
        ("as", Element::As),
        ("b", Element::B),
        ("c", Element::C),
        ("n", Element::N),
        ("o", Element::O),
        ("p", Element::P),
        ("s", Element::S),
    ];

    if first.is_ascii_lowercase() {
        for &(pat, elem) in AROMATIC {
            let end = *i + pat.chars().count();
            if end <= chars.len() && chars[*i..end].iter().copied().eq(pat.chars()) {
                *i = end;
                return Ok((Some(elem), true));
            }
        }
    }

    // Two-character symbols take precedence over one-character ones.
    if let Some(&second) = chars.get(*i + 1) {
        if first.is_ascii_uppercase() && second.is_ascii_lowercase() {
            let sym: String = [first, second].iter().collect();
            if let Some(e) = Element::from_symbol(&sym) {
                *i += 2;
                return Ok((Some(e), false));
            }
        }
    }

    if first.is_ascii_uppercase() {
        if let Some(e) = Element::from_symbol(&first.to_string()) {
            *i += 1;
            return Ok((Some(e), false));
        }
    }

    Err(SmilesError::InvalidElement {
        pos: *i,
        text: first.to_string(),
    })
}

fn parse_chirality(chars: &[char], i: &mut usize) -> ChiralityToken {
    if chars.get(*i) != Some(&'@') {
        return ChiralityToken::None;
    }
    *i += 1;
    if chars.get(*i) == Some(&'@') {
        *i += 1;
        ChiralityToken::Clockwise
    } else {
        ChiralityToken::CounterClockwise
    }
}

fn parse_hcount(chars: &[char], i: &mut usize) -> Option<u8> {
    if chars.get(*i) != Some(&'H') {
        return None;
    }
    *i += 1;
    match chars.get(*i).and_then(|c| c.to_digit(10)) {
        Some(d) => {
            *i += 1;
            Some(d as u8)
        }
        None => Some(1),
    }
}

fn parse_charge(chars: &[char], i: &mut usize, bracket_start: usize) -> Result<i8, SmilesError> {
    let sign: i8 = match chars.get(*i) {
        Some('+') => 1,
        Some('-') => -1,
        _ => return Ok(0),
    };
    let symbol = chars[*i];
    *i += 1;

    let invalid = SmilesError::InvalidCharge { pos: bracket_start };
    if chars.get(*i) == Some(&symbol) {
        // `++`, `---`: repeated sign
        let mut count: i8 = 1;
        while chars.get(*i) == Some(&symbol) {
            count = count.checked_add(1).ok_or(invalid.clone())?;
            *i += 1;
        }
        return Ok(sign * count);
    }
    match read_number(chars, i) {
        Some(v) => i8::try_from(v).map(|v| sign * v).map_err(|_| invalid),
        None => Ok(sign),
    }
}

fn parse_atom_class(chars: &[char], i: &mut usize, bracket_start: usize) -> Result<u32, SmilesError> {
    if chars.get(*i) != Some(&':') {
        return Ok(0);
    }
    *i += 1;
    let value = read_number(chars, i).ok_or(SmilesError::InvalidAtomClass { pos: bracket_start })?;
    u32::try_from(value).map_err(|_| SmilesError::InvalidAtomClass { pos: bracket_start })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom(tok: &Token) -> &AtomToken {
        match tok {
            Token::Atom(a) => a,
            other => panic!("expected atom, got {other:?}"),
        }
    }

    #[test]
    fn tokenize_methane() {
        let tokens = tokenize("C").unwrap();
        assert_eq!(tokens.len(), 1);
        let a = atom(&tokens[0]);
        assert_eq!(a.element, Some(Element::C));
        assert!(!a.is_bracket);
        assert!(!a.is_aromatic);
    }

    #[test]
    fn tokenize_two_letter_organic() {
        let tokens = tokenize("ClCBr").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(atom(&tokens[0]).element, Some(Element::Cl));
        assert_eq!(atom(&tokens[2]).element, Some(Element::Br));
    }

    #[test]
    fn tokenize_wildcard() {
        let tokens = tokenize("*C[*]").unwrap();
        assert_eq!(atom(&tokens[0]).element, None);
        assert_eq!(atom(&tokens[2]).element, None);
        assert!(atom(&tokens[2]).is_bracket);
    }

    #[test]
    fn tokenize_bracket_atom() {
        let tokens = tokenize("[NH4+]").unwrap();
        let a = atom(&tokens[0]);
        assert_eq!(a.element, Some(Element::N));
        assert_eq!(a.hcount, Some(4));
        assert_eq!(a.charge, 1);
    }

    #[test]
    fn tokenize_atom_class() {
        let tokens = tokenize("[CH3:12]").unwrap();
        assert_eq!(atom(&tokens[0]).atom_class, 12);
    }

    #[test]
    fn tokenize_isotope_and_chirality() {
        let tokens = tokenize("[13C@@H]").unwrap();
        let a = atom(&tokens[0]);
        assert_eq!(a.isotope, 13);
        assert_eq!(a.chirality, ChiralityToken::Clockwise);
        assert_eq!(a.hcount, Some(1));
    }

    #[test]
    fn ring_closure_takes_pending_bond() {
        let tokens = tokenize("C=1CC1").unwrap();
        assert!(matches!(
            &tokens[1],
            Token::RingClosure {
                bond: Some(BondToken::Double),
                digit: 1,
                ..
            }
        ));
    }

    #[test]
    fn tokenize_percent_ring() {
        let tokens = tokenize("C%10CC%10").unwrap();
        assert!(matches!(&tokens[1], Token::RingClosure { digit: 10, .. }));
    }

    #[test]
    fn charge_variants() {
        for (text, charge) in [("[O-]", -1), ("[O-2]", -2), ("[O--]", -2), ("[Fe+++]", 3)] {
            let tokens = tokenize(text).unwrap();
            assert_eq!(atom(&tokens[0]).charge, charge, "{text}");
        }
    }

    #[test]
    fn delimiters_are_not_smiles() {
        assert_eq!(
            tokenize("C>C").unwrap_err(),
            SmilesError::UnexpectedChar { pos: 1, ch: '>' }
        );
        assert!(tokenize("C|").is_err());
    }

    #[test]
    fn unclosed_bracket() {
        assert_eq!(
            tokenize("[C").unwrap_err(),
            SmilesError::UnclosedBracket { pos: 0 }
        );
    }
}
