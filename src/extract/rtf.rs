//! Minimal RTF to plain text conversion.

/// Destinations whose content is never visible text.
const SKIPPED_DESTINATIONS: &[&str] = &[
    "fonttbl", "colortbl", "stylesheet", "info", "pict", "header", "footer", "headerl", "headerr",
    "footerl", "footerr", "listtable", "listoverridetable", "rsidtbl", "generator", "xmlnstbl",
    "themedata", "colorschememapping", "latentstyles", "datastore", "object", "fldinst",
];

#[derive(Clone, Copy)]
struct GroupState {
    skip: bool,
    // Characters to drop after a `\uN` escape (`\ucN`).
    uc: usize,
}

pub fn to_plain_text(rtf: &str) -> String {
    let chars: Vec<char> = rtf.chars().collect();
    let mut out = String::with_capacity(rtf.len() / 2);
    let mut stack: Vec<GroupState> = Vec::new();
    let mut state = GroupState { skip: false, uc: 1 };
    let mut pending_skip = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '{' => {
                stack.push(state);
                i += 1;
            }
            '}' => {
                state = stack.pop().unwrap_or(GroupState { skip: false, uc: 1 });
                i += 1;
            }
            '\\' => {
                i += 1;
                let Some(&next) = chars.get(i) else { break };
                match next {
                    '\\' | '{' | '}' => {
                        emit(&mut out, &state, &mut pending_skip, next);
                        i += 1;
                    }
                    '\'' => {
                        let hex: String = chars.iter().skip(i + 1).take(2).collect();
                        i += 1 + hex.len();
                        if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                            emit(&mut out, &state, &mut pending_skip, decode_cp1252(byte));
                        }
                    }
                    '*' => {
                        state.skip = true;
                        i += 1;
                    }
                    '~' => {
                        emit(&mut out, &state, &mut pending_skip, ' ');
                        i += 1;
                    }
                    '-' | '_' => {
                        i += 1;
                    }
                    '\n' | '\r' => {
                        emit(&mut out, &state, &mut pending_skip, '\n');
                        i += 1;
                    }
                    c if c.is_ascii_alphabetic() => {
                        let start = i;
                        while i < chars.len() && chars[i].is_ascii_alphabetic() {
                            i += 1;
                        }
                        let word: String = chars[start..i].iter().collect();
                        let param_start = i;
                        if i < chars.len() && chars[i] == '-' {
                            i += 1;
                        }
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                        let param: Option<i32> = chars[param_start..i]
                            .iter()
                            .collect::<String>()
                            .parse()
                            .ok();
                        if i < chars.len() && chars[i] == ' ' {
                            i += 1;
                        }
                        control_word(&word, param, &mut state, &mut out, &mut pending_skip);
                    }
                    _ => {
                        i += 1;
                    }
                }
            }
            '\r' | '\n' => {
                i += 1;
            }
            _ => {
                emit(&mut out, &state, &mut pending_skip, c);
                i += 1;
            }
        }
    }

    out
}

fn control_word(
    word: &str,
    param: Option<i32>,
    state: &mut GroupState,
    out: &mut String,
    pending_skip: &mut usize,
) {
    if SKIPPED_DESTINATIONS.contains(&word) {
        state.skip = true;
        return;
    }
    match word {
        "par" | "line" | "row" | "sect" | "page" => emit(out, state, pending_skip, '\n'),
        "tab" | "cell" => emit(out, state, pending_skip, '\t'),
        "emdash" => emit(out, state, pending_skip, '—'),
        "endash" => emit(out, state, pending_skip, '–'),
        "lquote" | "rquote" => emit(out, state, pending_skip, '\''),
        "ldblquote" | "rdblquote" => emit(out, state, pending_skip, '"'),
        "bullet" => emit(out, state, pending_skip, '•'),
        "uc" => state.uc = param.unwrap_or(1).max(0) as usize,
        "u" => {
            if let Some(code) = param {
                // Negative values encode code points above 32767.
                let code = (if code < 0 { code + 65536 } else { code }) as u32;
                if let Some(ch) = char::from_u32(code) {
                    emit(out, state, pending_skip, ch);
                }
                *pending_skip = state.uc;
            }
        }
        _ => {}
    }
}

fn emit(out: &mut String, state: &GroupState, pending_skip: &mut usize, c: char) {
    if state.skip {
        return;
    }
    if *pending_skip > 0 && !matches!(c, '\n' | '\t') {
        *pending_skip -= 1;
        return;
    }
    out.push(c);
}

fn decode_cp1252(byte: u8) -> char {
    match byte {
        0x91 | 0x92 => '\'',
        0x93 | 0x94 => '"',
        0x96 => '–',
        0x97 => '—',
        0x95 => '•',
        0x85 => '…',
        b => b as char,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tables_and_formatting() {
        let rtf = r"{\rtf1\ansi{\fonttbl{\f0 Helvetica;}}{\colortbl;\red0\green0\blue0;}\f0\fs24 Course Code\tab Course Title\par BIBL 101\tab Intro to Bible\par}";
        assert_eq!(
            to_plain_text(rtf),
            "Course Code\tCourse Title\nBIBL 101\tIntro to Bible\n"
        );
    }

    #[test]
    fn decodes_escapes() {
        let rtf = r"{\rtf1 caf\'e9 \{x\} \u8212? done\par}";
        assert_eq!(to_plain_text(rtf), "café {x} — done\n");
    }

    #[test]
    fn skips_starred_destinations() {
        let rtf = r"{\rtf1{\*\expandedcolortbl;;}Hello\par}";
        assert_eq!(to_plain_text(rtf), "Hello\n");
    }
}
