use serde::{Deserialize, Serialize};

/// Title shown when a chapter cannot be resolved or has a blank heading.
pub const UNKNOWN_TITLE: &str = "Unknown";

/// A single chapter: a stable id, a display title, and the body text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    pub body: String,
}

impl Chapter {
    pub fn line_count(&self) -> usize {
        if self.body.is_empty() {
            0
        } else {
            self.body.lines().count()
        }
    }
}

/// An ordered set of chapters. The vector order is the navigation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub chapters: Vec<Chapter>,
}

impl Book {
    /// Split plain text into chapters at `# ` headings.
    ///
    /// Prose before the first heading becomes an "Introduction" chapter with
    /// id `intro`; heading chapters are numbered `ch1..chN` in order. A blank
    /// heading still starts a chapter, titled "Untitled".
    pub fn parse(title: impl Into<String>, text: &str) -> Self {
        let mut chapters = Vec::new();
        let mut current: Option<(String, Vec<&str>)> = None;
        let mut preamble: Vec<&str> = Vec::new();
        let mut heading_count = 0usize;

        let mut flush = |chapters: &mut Vec<Chapter>, id: String, title: String, lines: &[&str]| {
            chapters.push(Chapter {
                id,
                title,
                body: lines.join("\n").trim().to_string(),
            });
        };

        for line in text.lines() {
            if let Some(rest) = line.strip_prefix("# ") {
                if let Some((title, lines)) = current.take() {
                    flush(&mut chapters, format!("ch{heading_count}"), title, &lines);
                } else if preamble.iter().any(|l| !l.trim().is_empty()) {
                    flush(
                        &mut chapters,
                        "intro".to_string(),
                        "Introduction".to_string(),
                        &preamble,
                    );
                }
                heading_count += 1;
                let heading = rest.trim();
                let title = if heading.is_empty() {
                    "Untitled".to_string()
                } else {
                    heading.to_string()
                };
                current = Some((title, Vec::new()));
            } else {
                match current.as_mut() {
                    Some((_, lines)) => lines.push(line),
                    None => preamble.push(line),
                }
            }
        }

        if let Some((title, lines)) = current.take() {
            flush(&mut chapters, format!("ch{heading_count}"), title, &lines);
        } else if preamble.iter().any(|l| !l.trim().is_empty()) {
            flush(
                &mut chapters,
                "intro".to_string(),
                "Introduction".to_string(),
                &preamble,
            );
        }

        Self {
            title: title.into(),
            chapters,
        }
    }

    /// The built-in demo book used when no file is supplied.
    pub fn sample() -> Self {
        Self::parse("The Glass Harbour", SAMPLE_TEXT)
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    pub fn chapter(&self, id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == id)
    }

    pub fn chapter_at(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    /// Index of a chapter id in the navigation order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.chapters.iter().position(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn first_id(&self) -> Option<&str> {
        self.chapters.first().map(|c| c.id.as_str())
    }

    /// Chapter title lookup with the placeholder fallback.
    pub fn title_of(&self, id: &str) -> String {
        self.chapter(id)
            .map(|c| c.title.clone())
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
    }
}

const SAMPLE_TEXT: &str = r#"The town of Lowmarsh kept two harbours. The stone one held the
fishing fleet, and the other, the one the charts refused to name,
held nothing anyone would admit to. This is an account of the second
harbour, assembled from the papers of the pilot Edda Voss, and it
should be read the way she wrote it: slowly, and near a window.

# A Lamp in the Shallows

Edda Voss first saw the glass harbour on the night the herring fleet
came home early. There was a lamp burning under the water, a steady
green point far below the keels, and no one at the quay would look
at it twice. Her father said it was weed-light and went in to his
supper. Edda stayed on the wall until the tide turned.

She was eleven that autumn. By winter she had a notebook with forty
pages of bearings, moon phases, and little inked diagrams of where
the lamp sat against the pilings. The notebook smelled of tar all
her life.

# The Pilot's Examination

Nobody becomes a pilot in Lowmarsh by wanting it. The examination is
held in fog, by custom, and the examiner sits in the bow with a lead
line and says nothing for three hours. Edda passed on her second
attempt, the year she turned nineteen, by bringing the examiner over
the bar with six inches under the keel and her eyes shut.

Afterwards the old man asked her one question only: whether she had
ever seen a light where no light should be. She lied, and he nodded,
and that was how she knew he had seen it too.

# Charts and Their Silences

A chart is an argument about what matters. Depths, wrecks, cables,
the bones of the coast. What a chart leaves out it leaves out on
purpose, and the sheet for Lowmarsh had a smooth, confident blank
where the glass harbour lay. Edda wrote to the hydrographic office
twice. The first reply thanked her. The second did not come.

She began correcting her own copies in green ink. Pilots who
borrowed them returned them without comment, but they returned them
folded to that page.

# The Keeper of Accounts

Mr. Ambrose Tull kept the harbour ledger for forty years, and it was
said he could tell you the draught of any hull that had ever crossed
the bar. His ledger had a final column with no printed heading. In
it he recorded, in a hand smaller than the rest, the nights the
green lamp burned.

Edda bought him tea once a month for six years before he let her
copy the column. It agreed with her notebook to the night.

# Soundings

In her thirtieth year Edda took the pilot boat out alone, at slack
water, with a lead line and a borrowed echo sounder. Over the lamp
the lead found bottom at nine fathoms. The sounder, sweeping the
same spot, drew a second bottom under the first, faint and regular,
like a roof seen through smoke.

She did not tell the harbourmaster. She told Tull, who turned to the
back of the ledger and showed her the same figure, recorded by a
pilot drowned ninety years before.

# The Dry Summer

The year the rains failed, the estuary thinned until sandbars stood
up at noon like the backs of cattle. Boys walked out to places no
one had walked. One of them came back with a glass brick, green as
bottle glass, square as a loaf, and cold in the hand on the hottest
day of August.

The brick sat in the window of the chandlery for a month. Then the
rains came back, and one morning the window held only a ring of
dust. No one asked after it. Edda noted the date.

# What the Divers Found

The salvage firm came for a sunken dredger and stayed a week longer
than the job wanted. Their foreman drank at the Anchor and said,
once, to no one in particular, that there was a wall down there with
courses laid truer than any mason could lay them, and a doorway, and
that the door was shut.

He would not say more, and the firm did not come back, though the
dredger's winch is down there still and worth money.

# The Harbourmaster's Letter

When the new harbourmaster arrived he found a letter in the safe,
addressed to the office and not the man. It had been opened and
resealed so many times the flap would no longer hold. It said, in a
clerk's hand from some earlier century: the lower harbour pays no
dues and asks no pilot. Leave its trade to it.

He asked Edda what it meant. She said she did not know, which was
true, and that it meant what it said, which was also true.

# Night Passage

Only once did Edda take a ship across the glass harbour while the
lamp burned. A coaster, dragging her anchor in a November gale, came
down on the bar sideways and there was no deep water left to offer
her. Edda conned her straight over the blank on the chart.

For a count of ten the leadsman called no bottom. The compass rose
swung slow and came back true. Under the keel, through the storm
water, the green light rose to meet them and passed astern like a
lamp carried down a corridor. The coaster lived. Edda logged the
passage in green ink.

# The Commission

After the war a commission sat to modernise the small ports, and
Lowmarsh was to be dredged, straightened, and lit. The engineers'
drawings reached the glass harbour and stopped. Cores came up empty
where the wall should be. Borings bent. A surveyor resigned rather
than sign his own sections.

The commission reported that the lower anchorage was economically
marginal, and the money went elsewhere. Edda kept a copy of the
report. In the margin of page nine someone had written, not in her
hand: marginal is the right word.

# Edda's Bequest

Edda Voss piloted for fifty-one years and died ashore, in sight of
the wall where she had watched as a girl. Her will was short. The
notebooks went to the harbour office, on the condition that they be
shelved with the ledgers and never catalogued. The green ink went,
with her pen, to whoever held the pilot's warrant after her.

The warrant has changed hands four times since. The pen goes with
it. So, the pilots say, does the habit of looking over the wall at
slack water, just in case.

# The Second Harbour

There is a lamp burning under the water at Lowmarsh, and a harbour
around it that takes no dues and asks no pilot. The town has decided
not to decide what it is, which may be wisdom. Charts age, ledgers
close, commissions move on; the tide comes and goes over the blank
on the sheet, twice a day, careful as a lamplighter.

If you stand on the wall at slack water you may see it: a steady
green point, far down, patient, lit for someone. The fishing fleet
comes home over it every evening and never looks down. This account
is left, like the lamp, for whoever it is meant for.
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preamble_becomes_intro() {
        let book = Book::parse("T", "before heading\n\n# One\nbody one\n");
        assert_eq!(book.len(), 2);
        assert_eq!(book.chapters[0].id, "intro");
        assert_eq!(book.chapters[0].title, "Introduction");
        assert_eq!(book.chapters[0].body, "before heading");
        assert_eq!(book.chapters[1].id, "ch1");
        assert_eq!(book.chapters[1].title, "One");
        assert_eq!(book.chapters[1].body, "body one");
    }

    #[test]
    fn test_parse_without_preamble_has_no_intro() {
        let book = Book::parse("T", "# Alpha\na\n# Beta\nb\n");
        assert_eq!(book.len(), 2);
        assert_eq!(book.chapters[0].id, "ch1");
        assert_eq!(book.chapters[1].id, "ch2");
    }

    #[test]
    fn test_parse_blank_heading_gets_placeholder_title() {
        let book = Book::parse("T", "# \nsomething\n");
        assert_eq!(book.chapters[0].title, "Untitled");
    }

    #[test]
    fn test_parse_blank_preamble_is_dropped() {
        let book = Book::parse("T", "\n\n# One\nbody\n");
        assert_eq!(book.len(), 1);
        assert_eq!(book.chapters[0].id, "ch1");
    }

    #[test]
    fn test_position_and_lookup() {
        let book = Book::parse("T", "intro text\n# One\na\n# Two\nb\n");
        assert_eq!(book.position("intro"), Some(0));
        assert_eq!(book.position("ch2"), Some(2));
        assert_eq!(book.position("ch9"), None);
        assert!(book.contains("ch1"));
        assert!(!book.contains("chapter-1"));
        assert_eq!(book.chapter("ch1").unwrap().title, "One");
    }

    #[test]
    fn test_title_of_falls_back_to_unknown() {
        let book = Book::parse("T", "# One\na\n");
        assert_eq!(book.title_of("ch1"), "One");
        assert_eq!(book.title_of("nope"), UNKNOWN_TITLE);
    }

    #[test]
    fn test_sample_book_shape() {
        let book = Book::sample();
        assert_eq!(book.len(), 13);
        assert_eq!(book.first_id(), Some("intro"));
        assert_eq!(book.chapters.last().unwrap().id, "ch12");
        assert!(book.chapters.iter().all(|c| !c.body.is_empty()));
    }

    #[test]
    fn test_chapter_line_count() {
        let book = Book::parse("T", "# One\nfirst\nsecond\n");
        assert_eq!(book.chapter("ch1").unwrap().line_count(), 2);
        let empty = Book::parse("T", "# One\n");
        assert_eq!(empty.chapter("ch1").unwrap().line_count(), 0);
    }
}
