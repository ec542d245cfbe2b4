use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::config::ExtractionConfig;

static ID_RESO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)C[oó]digo:\s*([A-Z0-9\-]+)").unwrap());
static ACTA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)Acta:\s*(\d+)").unwrap());
static TIPO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)RESOLUCI[ÓO]N\s+SESI[ÓO]N\s+([A-ZÁÉÍÓÚÑ ]+)").unwrap()
});
static FECHA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})\s+de\s+([a-záéíóú]+)\s+de\s+(\d{4})").unwrap()
});
// NFD file names spell "ó" as "o" + combining acute
static FILENAME_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^resoluci(?:o\x{301}|[oó])n[_\-\s]*").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionType {
    Ordinaria,
    Extraordinaria,
    /// Unrecognized session title, title-cased.
    Other(String),
}

impl SessionType {
    pub fn as_str(&self) -> &str {
        match self {
            SessionType::Ordinaria => "Ordinaria",
            SessionType::Extraordinaria => "Extraordinaria",
            SessionType::Other(s) => s,
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SessionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DocumentMetadata {
    pub id_reso: String,
    pub acta: Option<String>,
    pub tipo: Option<SessionType>,
    pub fecha_texto: Option<String>,
    pub fecha_iso: Option<String>,
    /// Always the year of `fecha_iso`.
    pub anio: Option<i32>,
}

/// Read the header fields from the unfiltered page text. The stamps the
/// normalizer throws away are the most reliable place to find them.
pub fn extract_metadata(raw_text: &str, filename: &str, cfg: &ExtractionConfig) -> DocumentMetadata {
    let id_reso = ID_RESO_RE
        .captures(raw_text)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| id_from_filename(filename));

    let acta = ACTA_RE.captures(raw_text).map(|c| c[1].to_string());

    let tipo = TIPO_RE
        .captures(raw_text)
        .and_then(|c| normalize_tipo(&c[1]));

    let (fecha_texto, fecha_iso) = match FECHA_RE.captures(raw_text) {
        Some(caps) => {
            let iso = to_iso(&caps[1], &caps[2], &caps[3], cfg);
            (Some(caps[0].to_string()), iso)
        }
        None => (None, None),
    };
    let anio = fecha_iso
        .as_deref()
        .and_then(|iso| iso.get(..4))
        .and_then(|y| y.parse::<i32>().ok());

    DocumentMetadata {
        id_reso,
        acta,
        tipo,
        fecha_texto,
        fecha_iso,
        anio,
    }
}

/// `Resolución_UC-CU-RES-022-2025.pdf` → `UC-CU-RES-022-2025`.
pub fn id_from_filename(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    FILENAME_PREFIX_RE.replace(&stem, "").into_owned()
}

/// Day, month name and year to `YYYY-MM-DD`. The day is not checked against
/// the month: "31 de setiembre" still yields `-09-31`.
fn to_iso(day: &str, month: &str, year: &str, cfg: &ExtractionConfig) -> Option<String> {
    let mm = cfg.month_number(month)?;
    let dd = day.parse::<u32>().ok()?;
    Some(format!("{}-{}-{:02}", year, mm, dd))
}

fn normalize_tipo(raw: &str) -> Option<SessionType> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    let folded = fold_diacritics(&collapsed.to_lowercase());
    // "ordinaria" is a substring of "extraordinaria"
    if folded.contains("extraordinaria") {
        Some(SessionType::Extraordinaria)
    } else if folded.contains("ordinaria") {
        Some(SessionType::Ordinaria)
    } else {
        Some(SessionType::Other(title_case(&collapsed)))
    }
}

fn fold_diacritics(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' => 'a',
            'é' | 'è' | 'ë' => 'e',
            'í' | 'ì' | 'ï' => 'i',
            'ó' | 'ò' | 'ö' => 'o',
            'ú' | 'ù' | 'ü' => 'u',
            'ñ' => 'n',
            _ => c,
        })
        .collect()
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str, filename: &str) -> DocumentMetadata {
        extract_metadata(text, filename, &ExtractionConfig::default())
    }

    #[test]
    fn fixture_header_fields() {
        let raw = ["resolucion_p1", "resolucion_p2"]
            .iter()
            .map(|n| std::fs::read_to_string(format!("tests/fixtures/{}.txt", n)).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        let m = extract(&raw, "cualquier_nombre.pdf");
        assert_eq!(m.id_reso, "UC-CU-RES-045-2024");
        assert_eq!(m.acta.as_deref(), Some("7"));
        assert_eq!(m.tipo, Some(SessionType::Ordinaria));
        assert_eq!(m.fecha_texto.as_deref(), Some("12 de marzo de 2024"));
        assert_eq!(m.fecha_iso.as_deref(), Some("2024-03-12"));
        assert_eq!(m.anio, Some(2024));
    }

    #[test]
    fn christmas_date() {
        let m = extract("Cuenca, 25 de diciembre de 2024", "x.pdf");
        assert_eq!(m.fecha_iso.as_deref(), Some("2024-12-25"));
        assert_eq!(m.anio, Some(2024));
    }

    #[test]
    fn impossible_date_is_kept_verbatim() {
        let m = extract("dado el 31 de setiembre de 2023", "x.pdf");
        assert_eq!(m.fecha_texto.as_deref(), Some("31 de setiembre de 2023"));
        assert_eq!(m.fecha_iso.as_deref(), Some("2023-09-31"));
        assert_eq!(m.anio, Some(2023));
    }

    #[test]
    fn single_digit_day_is_padded_and_case_ignored() {
        let m = extract("5 DE Septiembre DE 2022", "x.pdf");
        assert_eq!(m.fecha_iso.as_deref(), Some("2022-09-05"));
    }

    #[test]
    fn unknown_month_keeps_text_but_no_iso() {
        let m = extract("el 3 de brumario de 2021", "x.pdf");
        assert_eq!(m.fecha_texto.as_deref(), Some("3 de brumario de 2021"));
        assert_eq!(m.fecha_iso, None);
        assert_eq!(m.anio, None);
    }

    #[test]
    fn id_from_filename_when_no_label() {
        let m = extract("sin etiquetas", "Resolución_UC-CU-RES-022-2025.pdf");
        assert_eq!(m.id_reso, "UC-CU-RES-022-2025");
        assert_eq!(id_from_filename("RESOLUCION-UC-CU-RES-001-2021.pdf"), "UC-CU-RES-001-2021");
        assert_eq!(id_from_filename("Resolucio\u{301}n_ABC.pdf"), "ABC");
        assert_eq!(id_from_filename("acuerdo_12.pdf"), "acuerdo_12");
    }

    #[test]
    fn all_fields_absent_when_unmatched() {
        let m = extract("texto sin encabezados", "doc.pdf");
        assert_eq!(
            m,
            DocumentMetadata {
                id_reso: "doc".to_string(),
                ..DocumentMetadata::default()
            }
        );
    }

    #[test]
    fn session_type_normalization() {
        let tipo = |s: &str| extract(s, "x.pdf").tipo;
        assert_eq!(tipo("RESOLUCIÓN SESIÓN ORDINARIA"), Some(SessionType::Ordinaria));
        assert_eq!(tipo("RESOLUCION SESION EXTRAORDINARIA"), Some(SessionType::Extraordinaria));
        assert_eq!(
            tipo("Resolución Sesión SOLEMNE ESPECIAL"),
            Some(SessionType::Other("Solemne Especial".to_string()))
        );
        assert_eq!(tipo("sin sesión"), None);
    }

    #[test]
    fn first_code_label_wins() {
        let m = extract("Código: UC-CU-RES-001-2024\nCódigo: OTRO-2", "x.pdf");
        assert_eq!(m.id_reso, "UC-CU-RES-001-2024");
    }
}
