//! Font metrics for the builtin Helvetica faces
//!
//! Advance widths (1/1000 em) for printable ASCII, taken from the standard
//! Adobe AFM files. Used for centering, truncation and word wrapping; the PDF
//! itself references the builtin fonts, so no font program is embedded.

use super::layout::FontWeight;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // 'p'..'~'
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

const ELLIPSIS: &str = "...";

/// Width of one character in 1/1000 em; anything outside printable ASCII is
/// drawn as '?' by the PDF backend and measured as such
fn char_units(c: char, weight: FontWeight) -> u16 {
    let table = match weight {
        FontWeight::Regular => &HELVETICA,
        FontWeight::Bold => &HELVETICA_BOLD,
    };
    let code = c as u32;
    let index = if (32..127).contains(&code) { code - 32 } else { '?' as u32 - 32 };
    table[index as usize]
}

/// Rendered width of `text` in points
pub fn text_width(text: &str, size: f32, weight: FontWeight) -> f32 {
    let units: u32 = text.chars().map(|c| char_units(c, weight) as u32).sum();
    units as f32 * size / 1000.0
}

/// Cut `text` to fit `max_width`, marking the cut with "..."
pub fn fit_text(text: &str, size: f32, weight: FontWeight, max_width: f32) -> String {
    if text_width(text, size, weight) <= max_width {
        return text.to_string();
    }

    let budget = max_width - text_width(ELLIPSIS, size, weight);
    let mut used = 0.0;
    let mut out = String::new();
    for c in text.chars() {
        let w = char_units(c, weight) as f32 * size / 1000.0;
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    let trimmed = out.trim_end().len();
    out.truncate(trimmed);
    out.push_str(ELLIPSIS);
    out
}

/// Greedy word wrap; words wider than a whole line are split by character
pub fn wrap_text(text: &str, size: f32, weight: FontWeight, max_width: f32) -> Vec<String> {
    let space = text_width(" ", size, weight);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut line_width = 0.0;

    for word in text.split_whitespace() {
        let word_width = text_width(word, size, weight);

        if word_width > max_width {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                line_width = 0.0;
            }
            for c in word.chars() {
                let w = char_units(c, weight) as f32 * size / 1000.0;
                if line_width + w > max_width && !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                    line_width = 0.0;
                }
                line.push(c);
                line_width += w;
            }
            continue;
        }

        let needed = if line.is_empty() { word_width } else { line_width + space + word_width };
        if needed > max_width {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
            line_width = word_width;
        } else {
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
            line_width = needed;
        }
    }

    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width_uses_afm_widths() {
        // "Hi" = 722 + 222 at 10pt
        assert!((text_width("Hi", 10.0, FontWeight::Regular) - 9.44).abs() < 0.001);
        assert!(text_width("Hi", 10.0, FontWeight::Bold) > text_width("Hi", 10.0, FontWeight::Regular));
    }

    #[test]
    fn test_non_ascii_measured_as_question_mark() {
        let q = text_width("?", 11.0, FontWeight::Regular);
        assert_eq!(text_width("é", 11.0, FontWeight::Regular), q);
    }

    #[test]
    fn test_fit_text_keeps_short_text() {
        assert_eq!(fit_text("Fever", 11.0, FontWeight::Regular, 200.0), "Fever");
    }

    #[test]
    fn test_fit_text_truncates_with_ellipsis() {
        let long = "Chronic gastritis with intermittent epigastric pain";
        let fitted = fit_text(long, 11.0, FontWeight::Regular, 100.0);
        assert!(fitted.ends_with("..."));
        assert!(text_width(&fitted, 11.0, FontWeight::Regular) <= 100.0);
    }

    #[test]
    fn test_wrap_text_respects_width() {
        let text = "Dr. Anand Kumar has handled 12 appointments this week with 9 completed consultations.";
        let lines = wrap_text(text, 11.0, FontWeight::Regular, 200.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width(line, 11.0, FontWeight::Regular) <= 200.0);
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_text_splits_oversized_word() {
        let lines = wrap_text("abcdefghijklmnopqrstuvwxyz", 10.0, FontWeight::Regular, 40.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "abcdefghijklmnopqrstuvwxyz");
    }
}
