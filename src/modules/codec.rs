use crate::modules::types::ListEntry;

/// Parses list text into entries, in line order.
///
/// Blank lines and lines starting with `#` are comments. Everything after the first `#`
/// of a line is its note, so `a.com # x # y` has note `x # y`. Lines whose domain part is
/// empty are dropped.
pub fn decode(text: &str) -> Vec<ListEntry> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (domain, note) = match line.split_once('#') {
                Some((domain, note)) => (domain.trim(), note.trim()),
                None => (line, ""),
            };
            if domain.is_empty() {
                return None;
            }
            Some(ListEntry::new(domain, note))
        })
        .collect()
}

/// Writes entries back as list text, one per line.
pub fn encode(entries: &[ListEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            if entry.note.is_empty() {
                entry.domain.clone()
            } else {
                format!("{} #{}", entry.domain, entry.note)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_keeps_embedded_hashes() {
        assert_eq!(
            decode("foo.com # hello # world"),
            vec![ListEntry::new("foo.com", "hello # world")]
        );
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        assert_eq!(
            decode("# just a comment\n\nbar.com\n"),
            vec![ListEntry::new("bar.com", "")]
        );
    }

    #[test]
    fn note_without_domain_is_dropped() {
        assert!(decode("#nodomain").is_empty());
        assert!(decode("   # indented comment\n \t \n").is_empty());
    }

    #[test]
    fn order_and_spacing_variants() {
        let text = "b.com\r\n  a.com#tight\nc.com    #   wide   \n";
        assert_eq!(
            decode(text),
            vec![
                ListEntry::new("b.com", ""),
                ListEntry::new("a.com", "tight"),
                ListEntry::new("c.com", "wide"),
            ]
        );
    }

    #[test]
    fn encode_writes_notes_after_hash() {
        let entries = vec![ListEntry::new("a.com", ""), ListEntry::new("b.com", "spam")];
        assert_eq!(encode(&entries), "a.com\nb.com #spam");
        assert_eq!(encode(&[]), "");
    }

    #[test]
    fn decode_encode_is_stable() {
        let samples = [
            "example.com\nallowed.org #test note",
            "# header\n\nx.com # a # b\n#only\n  y.com  \nz.com#\n",
            "",
            "#\n##\n # \n",
        ];
        for text in samples {
            let once = decode(text);
            assert_eq!(decode(&encode(&once)), once, "unstable for {text:?}");
        }
    }
}
