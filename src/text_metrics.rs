use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use ttf_parser::Face;

const FALLBACK_ADVANCE_EM: f64 = 0.56;

/// Glyph-advance text measurement over the system font database.
///
/// Faces are resolved lazily per `(family list, weight)` and cached,
/// including failed lookups, so a missing font costs one query.
pub struct FontMetrics {
    inner: Mutex<FontCache>,
}

struct FontCache {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<(String, u16), Option<FontFace>>,
}

impl FontMetrics {
    pub fn new() -> Self {
        Self::with_database(Database::new(), false)
    }

    /// Measures against a prepared database. Unless `loaded_system_fonts` is
    /// set, system fonts are added to it on the first lookup.
    pub fn with_database(db: Database, loaded_system_fonts: bool) -> Self {
        Self {
            inner: Mutex::new(FontCache {
                db,
                loaded_system_fonts,
                faces: HashMap::new(),
            }),
        }
    }

    pub fn measure(&self, text: &str, font_size: f64, font_family: &str, weight: u16) -> Option<f64> {
        if text.is_empty() || font_size <= 0.0 {
            return Some(0.0);
        }
        let mut cache = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        cache.measure(text, font_size, font_family, weight)
    }
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl FontCache {
    fn measure(&mut self, text: &str, font_size: f64, font_family: &str, weight: u16) -> Option<f64> {
        let key = (normalize_family_key(font_family), weight);
        if !self.faces.contains_key(&key) {
            let face = self.load_face(font_family, weight);
            if face.is_none() {
                tracing::warn!(family = %key.0, weight, "no font face found; using fallback metrics");
            }
            self.faces.insert(key.clone(), face);
        }
        let face = self.faces.get_mut(&key).and_then(|face| face.as_mut())?;
        let normalized = text.replace('\t', "    ");
        face.measure_width(&normalized, font_size)
    }

    fn load_face(&mut self, font_family: &str, weight: u16) -> Option<FontFace> {
        let names = parse_family_list(font_family);
        let families: Vec<Family<'_>> = names.iter().map(FamilyToken::as_family).collect();

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight(weight),
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| FontFace::parse(data.to_vec(), index))
            .flatten()
    }
}

enum FamilyToken {
    Generic(Family<'static>),
    Name(String),
}

impl FamilyToken {
    fn as_family(&self) -> Family<'_> {
        match self {
            FamilyToken::Generic(family) => *family,
            FamilyToken::Name(name) => Family::Name(name.as_str()),
        }
    }
}

fn parse_family_list(font_family: &str) -> Vec<FamilyToken> {
    let mut order = Vec::new();
    for part in font_family.split(',') {
        let raw = part.trim().trim_matches('"').trim_matches('\'');
        if raw.is_empty() {
            continue;
        }
        let token = match raw.to_ascii_lowercase().as_str() {
            "serif" => FamilyToken::Generic(Family::Serif),
            "sans-serif" => FamilyToken::Generic(Family::SansSerif),
            "monospace" => FamilyToken::Generic(Family::Monospace),
            "cursive" => FamilyToken::Generic(Family::Cursive),
            "fantasy" => FamilyToken::Generic(Family::Fantasy),
            "system-ui" | "-apple-system" | "ui-sans-serif" => FamilyToken::Generic(Family::SansSerif),
            "ui-monospace" => FamilyToken::Generic(Family::Monospace),
            _ => FamilyToken::Name(raw.to_string()),
        };
        order.push(token);
    }
    if order.is_empty() {
        order.push(FamilyToken::Generic(Family::SansSerif));
    }
    order
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: u16,
    ascii_advances: [u16; 128],
    advance_cache: HashMap<char, Option<u16>>,
}

impl FontFace {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em().max(1);
        let mut ascii_advances = [0u16; 128];
        for byte in 0u8..=127 {
            if let Some(glyph_id) = face.glyph_index(byte as char) {
                ascii_advances[byte as usize] = face.glyph_hor_advance(glyph_id).unwrap_or(0);
            }
        }
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
            advance_cache: HashMap::new(),
        })
    }

    fn measure_width(&mut self, text: &str, font_size: f64) -> Option<f64> {
        let scale = font_size / self.units_per_em as f64;
        let fallback = font_size * FALLBACK_ADVANCE_EM;

        if text.is_ascii() {
            let width = text
                .bytes()
                .filter(|byte| *byte != b'\n')
                .map(|byte| match self.ascii_advances[byte as usize] {
                    0 => fallback,
                    advance => advance as f64 * scale,
                })
                .sum::<f64>();
            return Some(width.max(0.0));
        }

        let missing: Vec<char> = text
            .chars()
            .filter(|ch| *ch != '\n' && !self.advance_cache.contains_key(ch))
            .collect();
        if !missing.is_empty() {
            let face = Face::parse(&self.data, self.index).ok()?;
            for ch in missing {
                let advance = face.glyph_index(ch).and_then(|id| face.glyph_hor_advance(id));
                self.advance_cache.insert(ch, advance);
            }
        }

        let mut width = 0.0;
        for ch in text.chars().filter(|ch| *ch != '\n') {
            width += match self.advance_cache.get(&ch).copied().flatten() {
                Some(advance) => advance as f64 * scale,
                None => fallback,
            };
        }
        Some(width.max(0.0))
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}
