use std::fmt;
use std::str::FromStr;

/// Which keyword vocabulary the lexer and diagnostics use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Plain,
    Colorful,
}

impl Mode {
    pub fn from_flag(is_alternate: bool) -> Self {
        if is_alternate {
            Mode::Colorful
        } else {
            Mode::Plain
        }
    }

    pub fn is_alternate(&self) -> bool {
        *self == Mode::Colorful
    }

    pub fn keywords(&self) -> &'static KeywordTable {
        keywords_for(*self)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Plain => "plain",
            Mode::Colorful => "colorful",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "simple" => Ok(Mode::Plain),
            "colorful" | "colourful" => Ok(Mode::Colorful),
            other => Err(format!("unknown mode '{}', expected 'plain' or 'colorful'", other)),
        }
    }
}

/// Surface spelling of every logical keyword for one mode.
///
/// Entries may be phrases of several words; the lexer matches them over
/// consecutive word segments.
#[derive(Debug, PartialEq, Eq)]
pub struct KeywordTable {
    pub start: &'static str,
    pub end: &'static str,
    pub print: &'static str,
    pub variable_assign: &'static str,
    pub list_prefix: &'static str,
    pub if_: &'static str,
    pub then: &'static str,
    pub else_: &'static str,
    pub repeat: &'static str,
    pub times: &'static str,
    pub function: &'static str,
    pub comment: &'static str,
}

impl KeywordTable {
    /// The declaration phrase, if this mode has one made of words.
    ///
    /// Plain mode declares with the bare `=` sign, which the lexer already
    /// handles as punctuation.
    pub fn declaration_phrase(&self) -> Option<&'static str> {
        if self.variable_assign.chars().any(char::is_alphabetic) {
            Some(self.variable_assign)
        } else {
            None
        }
    }
}

pub const PLAIN_KEYWORDS: KeywordTable = KeywordTable {
    start: "start",
    end: "end",
    print: "print",
    variable_assign: "=",
    list_prefix: "list",
    if_: "jo",
    then: "to",
    else_: "nahi to",
    repeat: "repeat",
    times: "vaar",
    function: "function",
    comment: "#",
};

pub const COLORFUL_KEYWORDS: KeywordTable = KeywordTable {
    start: "sharu",
    end: "samaapt",
    print: "lakh chodya",
    variable_assign: "loda ayia nakh",
    list_prefix: "loda ayia nakh list",
    if_: "jo",
    then: "to",
    else_: "nahi to",
    repeat: "repeat",
    times: "vaar",
    function: "function",
    comment: "#",
};

pub fn keywords_for(mode: Mode) -> &'static KeywordTable {
    match mode {
        Mode::Plain => &PLAIN_KEYWORDS,
        Mode::Colorful => &COLORFUL_KEYWORDS,
    }
}

/// A canned program in both vocabularies, with the output it prints.
#[derive(Debug)]
pub struct Example {
    pub name: &'static str,
    pub plain: &'static str,
    pub colorful: &'static str,
    pub plain_output: &'static [&'static str],
    pub colorful_output: &'static [&'static str],
}

impl Example {
    pub fn source(&self, mode: Mode) -> &'static str {
        match mode {
            Mode::Plain => self.plain,
            Mode::Colorful => self.colorful,
        }
    }

    pub fn expected_output(&self, mode: Mode) -> &'static [&'static str] {
        match mode {
            Mode::Plain => self.plain_output,
            Mode::Colorful => self.colorful_output,
        }
    }
}

pub const EXAMPLES: &[Example] = &[
    Example {
        name: "hello",
        plain: "start:\n  print: \"Kem cho bhai!\"\nend:",
        colorful: "sharu:\n  lakh chodya: \"Kem cho loda!\"\nsamaapt:",
        plain_output: &["Kem cho bhai!"],
        colorful_output: &["Kem cho loda!"],
    },
    Example {
        name: "conditional",
        plain: "start:
  umar = 25
  jo (umar > 18) to {
    print: \"Tame adult cho\"
  } nahi to {
    print: \"Tame balak cho\"
  }
end:",
        colorful: "sharu:
  loda ayia nakh umar = 25
  jo (umar > 18) to {
    lakh chodya: \"Bhos, tame mota cho\"
  } nahi to {
    lakh chodya: \"Chodya balak\"
  }
samaapt:",
        plain_output: &["Tame adult cho"],
        colorful_output: &["Bhos, tame mota cho"],
    },
    Example {
        name: "loop",
        plain: "start:
  repeat 5 vaar {
    print: \"Maja ma che\"
  }
end:",
        colorful: "sharu:
  repeat 5 vaar {
    lakh chodya: \"Maja avi gai chodya\"
  }
samaapt:",
        plain_output: &["Maja ma che"; 5],
        colorful_output: &["Maja avi gai chodya"; 5],
    },
    Example {
        name: "function",
        plain: "start:
  function bolavo(naam) {
    print: \"Kem cho \" + naam
  }
  bolavo(\"Bhai\")
end:",
        colorful: "sharu:
  function loda_bolavo(naam) {
    lakh chodya: \"Kem cho loda \" + naam
  }
  loda_bolavo(\"Bhai\")
samaapt:",
        plain_output: &["Kem cho Bhai"],
        colorful_output: &["Kem cho loda Bhai"],
    },
    Example {
        name: "array",
        plain: "start:
  list mitro = [\"Ram\", \"Shyam\", \"Mohan\"]
  print: mitro[0]
  print: \"Total mitro: \" + mitro.length
end:",
        colorful: "sharu:
  loda ayia nakh list lodo = [\"Ram\", \"Shyam\", \"Mohan\"]
  lakh chodya: lodo[0]
  lakh chodya: \"Total lodo: \" + lodo.length
samaapt:",
        plain_output: &["Ram", "Total mitro: 3"],
        colorful_output: &["Ram", "Total lodo: 3"],
    },
];

pub fn example_names() -> impl Iterator<Item = &'static str> {
    EXAMPLES.iter().map(|example| example.name)
}

pub fn find_example(name: &str) -> Option<&'static Example> {
    EXAMPLES.iter().find(|example| example.name == name)
}

/// Source of the named example in `mode`, or `None` for an unknown name.
pub fn example(name: &str, mode: Mode) -> Option<&'static str> {
    find_example(name).map(|example| example.source(mode))
}
