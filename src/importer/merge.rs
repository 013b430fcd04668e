/// Fold a chord line into the lyric line beneath it.
///
/// Each run of non-space characters in `chord_line` is a chord, placed at
/// the character column where it starts. Chords are inserted as `[chord]`
/// from right to left so earlier columns stay valid. Columns past the end of
/// the lyric append the chord at the end, keeping left-to-right order when
/// several chords overhang.
pub fn merge_chord_line(chord_line: &str, text_line: &str) -> String {
    if chord_line.trim().is_empty() {
        return text_line.to_string();
    }

    let mut result = text_line.to_string();
    for (column, chord) in chord_columns(chord_line).into_iter().rev() {
        // Offsets into the original line stay valid: every earlier insertion
        // sits at or after this one.
        let at = byte_offset(text_line, column);
        result.insert_str(at, &format!("[{chord}]"));
    }
    result
}

/// Chords with their starting character column. Only `' '` separates chords.
fn chord_columns(chord_line: &str) -> Vec<(usize, &str)> {
    let mut chords = Vec::new();
    let mut start: Option<(usize, usize)> = None;

    for (column, (offset, c)) in chord_line.char_indices().enumerate() {
        match (c == ' ', start) {
            (true, Some((begin_column, begin_offset))) => {
                chords.push((begin_column, &chord_line[begin_offset..offset]));
                start = None;
            }
            (false, None) => start = Some((column, offset)),
            _ => {}
        }
    }
    if let Some((begin_column, begin_offset)) = start {
        chords.push((begin_column, &chord_line[begin_offset..]));
    }
    chords
}

/// Byte index of character `column`, clamped to the end of `text`.
fn byte_offset(text: &str, column: usize) -> usize {
    text.char_indices()
        .nth(column)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}
