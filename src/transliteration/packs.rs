//! Built-in script tables.
//!
//! Each row is `(native, latin)` in lower case. Row order matters when
//! converting towards the native script: the first row for a Latin
//! sequence wins.

/// Conversion table for one language
#[derive(Debug, Clone, Copy)]
pub struct LanguagePack {
    /// Language code
    pub code: &'static str,
    /// Display name
    pub name: &'static str,
    /// `(native, latin)` rows
    pub rows: &'static [(&'static str, &'static str)],
}

/// Every built-in pack
pub const PACKS: &[LanguagePack] = &[
    RUSSIAN, UKRAINIAN, BULGARIAN, MACEDONIAN, SERBIAN, MONGOLIAN, GREEK, ARMENIAN, GEORGIAN,
    LATIN1,
];

#[rustfmt::skip]
const RUSSIAN: LanguagePack = LanguagePack {
    code: "ru",
    name: "Russian",
    rows: &[
        ("а", "a"), ("б", "b"), ("в", "v"), ("г", "g"), ("д", "d"), ("е", "e"),
        ("ё", "yo"), ("ж", "zh"), ("з", "z"), ("и", "i"), ("й", "j"), ("к", "k"),
        ("л", "l"), ("м", "m"), ("н", "n"), ("о", "o"), ("п", "p"), ("р", "r"),
        ("с", "s"), ("т", "t"), ("у", "u"), ("ф", "f"), ("х", "h"), ("ц", "ts"),
        ("ч", "ch"), ("ш", "sh"), ("щ", "sch"), ("ъ", "\""), ("ы", "y"), ("ь", "'"),
        ("э", "e'"), ("ю", "ju"), ("я", "ja"),
    ],
};

#[rustfmt::skip]
const UKRAINIAN: LanguagePack = LanguagePack {
    code: "uk",
    name: "Ukrainian",
    rows: &[
        ("а", "a"), ("б", "b"), ("в", "v"), ("г", "h"), ("ґ", "g"), ("д", "d"),
        ("е", "e"), ("є", "je"), ("ж", "zh"), ("з", "z"), ("и", "y"), ("і", "i"),
        ("ї", "ji"), ("й", "j"), ("к", "k"), ("л", "l"), ("м", "m"), ("н", "n"),
        ("о", "o"), ("п", "p"), ("р", "r"), ("с", "s"), ("т", "t"), ("у", "u"),
        ("ф", "f"), ("х", "kh"), ("ц", "ts"), ("ч", "ch"), ("ш", "sh"), ("щ", "shch"),
        ("ь", "'"), ("ю", "ju"), ("я", "ja"),
    ],
};

#[rustfmt::skip]
const BULGARIAN: LanguagePack = LanguagePack {
    code: "bg",
    name: "Bulgarian",
    rows: &[
        ("а", "a"), ("б", "b"), ("в", "v"), ("г", "g"), ("д", "d"), ("е", "e"),
        ("ж", "zh"), ("з", "z"), ("и", "i"), ("й", "j"), ("к", "k"), ("л", "l"),
        ("м", "m"), ("н", "n"), ("о", "o"), ("п", "p"), ("р", "r"), ("с", "s"),
        ("т", "t"), ("у", "u"), ("ф", "f"), ("х", "h"), ("ц", "ts"), ("ч", "ch"),
        ("ш", "sh"), ("щ", "sht"), ("ъ", "y"), ("ь", "'"), ("ю", "yu"), ("я", "ya"),
    ],
};

#[rustfmt::skip]
const MACEDONIAN: LanguagePack = LanguagePack {
    code: "mk",
    name: "Macedonian",
    rows: &[
        ("а", "a"), ("б", "b"), ("в", "v"), ("г", "g"), ("д", "d"), ("ѓ", "gj"),
        ("е", "e"), ("ж", "zh"), ("з", "z"), ("ѕ", "dz"), ("и", "i"), ("ј", "j"),
        ("к", "k"), ("л", "l"), ("љ", "lj"), ("м", "m"), ("н", "n"), ("њ", "nj"),
        ("о", "o"), ("п", "p"), ("р", "r"), ("с", "s"), ("т", "t"), ("ќ", "kj"),
        ("у", "u"), ("ф", "f"), ("х", "h"), ("ц", "c"), ("ч", "ch"), ("џ", "dzh"),
        ("ш", "sh"),
    ],
};

#[rustfmt::skip]
const SERBIAN: LanguagePack = LanguagePack {
    code: "sr",
    name: "Serbian",
    rows: &[
        ("а", "a"), ("б", "b"), ("в", "v"), ("г", "g"), ("д", "d"), ("ђ", "đ"),
        ("е", "e"), ("ж", "ž"), ("з", "z"), ("и", "i"), ("ј", "j"), ("к", "k"),
        ("л", "l"), ("љ", "lj"), ("м", "m"), ("н", "n"), ("њ", "nj"), ("о", "o"),
        ("п", "p"), ("р", "r"), ("с", "s"), ("т", "t"), ("ћ", "ć"), ("у", "u"),
        ("ф", "f"), ("х", "h"), ("ц", "c"), ("ч", "č"), ("џ", "dž"), ("ш", "š"),
    ],
};

#[rustfmt::skip]
const MONGOLIAN: LanguagePack = LanguagePack {
    code: "mn",
    name: "Mongolian",
    rows: &[
        ("а", "a"), ("б", "b"), ("в", "v"), ("г", "g"), ("д", "d"), ("е", "ye"),
        ("ё", "yo"), ("ж", "j"), ("з", "z"), ("и", "i"), ("й", "i"), ("к", "k"),
        ("л", "l"), ("м", "m"), ("н", "n"), ("о", "o"), ("ө", "ö"), ("п", "p"),
        ("р", "r"), ("с", "s"), ("т", "t"), ("у", "u"), ("ү", "ü"), ("ф", "f"),
        ("х", "kh"), ("ц", "ts"), ("ч", "ch"), ("ш", "sh"), ("щ", "shch"), ("ъ", "\""),
        ("ы", "y"), ("ь", "'"), ("э", "e"), ("ю", "yu"), ("я", "ya"),
    ],
};

#[rustfmt::skip]
const GREEK: LanguagePack = LanguagePack {
    code: "el",
    name: "Greek",
    rows: &[
        ("ου", "ou"), ("α", "a"), ("β", "v"), ("γ", "g"), ("δ", "d"), ("ε", "e"),
        ("ζ", "z"), ("η", "i"), ("θ", "th"), ("ι", "i"), ("κ", "k"), ("λ", "l"),
        ("μ", "m"), ("ν", "n"), ("ξ", "x"), ("ο", "o"), ("π", "p"), ("ρ", "r"),
        ("σ", "s"), ("ς", "s"), ("τ", "t"), ("υ", "y"), ("φ", "f"), ("χ", "ch"),
        ("ψ", "ps"), ("ω", "o"), ("ά", "a"), ("έ", "e"), ("ή", "i"), ("ί", "i"),
        ("ό", "o"), ("ύ", "y"), ("ώ", "o"),
    ],
};

#[rustfmt::skip]
const ARMENIAN: LanguagePack = LanguagePack {
    code: "hy",
    name: "Armenian",
    rows: &[
        ("ու", "u"), ("ա", "a"), ("բ", "b"), ("գ", "g"), ("դ", "d"), ("ե", "e"),
        ("զ", "z"), ("է", "e"), ("ը", "y"), ("թ", "t'"), ("ժ", "zh"), ("ի", "i"),
        ("լ", "l"), ("խ", "kh"), ("ծ", "ts"), ("կ", "k"), ("հ", "h"), ("ձ", "dz"),
        ("ղ", "gh"), ("ճ", "tch"), ("մ", "m"), ("յ", "y"), ("ն", "n"), ("շ", "sh"),
        ("ո", "o"), ("չ", "ch"), ("պ", "p"), ("ջ", "j"), ("ռ", "r"), ("ս", "s"),
        ("վ", "v"), ("տ", "t"), ("ր", "r"), ("ց", "c"), ("փ", "p'"), ("ք", "k'"),
        ("և", "ev"), ("օ", "o"), ("ֆ", "f"),
    ],
};

#[rustfmt::skip]
const GEORGIAN: LanguagePack = LanguagePack {
    code: "ka",
    name: "Georgian",
    rows: &[
        ("ა", "a"), ("ბ", "b"), ("გ", "g"), ("დ", "d"), ("ე", "e"), ("ვ", "v"),
        ("ზ", "z"), ("თ", "t"), ("ი", "i"), ("კ", "k'"), ("ლ", "l"), ("მ", "m"),
        ("ნ", "n"), ("ო", "o"), ("პ", "p'"), ("ჟ", "zh"), ("რ", "r"), ("ს", "s"),
        ("ტ", "t'"), ("უ", "u"), ("ფ", "p"), ("ქ", "k"), ("ღ", "gh"), ("ყ", "q'"),
        ("შ", "sh"), ("ჩ", "ch"), ("ც", "ts"), ("ძ", "dz"), ("წ", "ts'"), ("ჭ", "ch'"),
        ("ხ", "kh"), ("ჯ", "j"), ("ჰ", "h"),
    ],
};

#[rustfmt::skip]
const LATIN1: LanguagePack = LanguagePack {
    code: "l1",
    name: "Latin-1 Supplement",
    rows: &[
        ("à", "a"), ("á", "a"), ("â", "a"), ("ã", "a"), ("ä", "a"), ("å", "a"),
        ("æ", "ae"), ("ç", "c"), ("è", "e"), ("é", "e"), ("ê", "e"), ("ë", "e"),
        ("ì", "i"), ("í", "i"), ("î", "i"), ("ï", "i"), ("ð", "d"), ("ñ", "n"),
        ("ò", "o"), ("ó", "o"), ("ô", "o"), ("õ", "o"), ("ö", "o"), ("ø", "o"),
        ("ù", "u"), ("ú", "u"), ("û", "u"), ("ü", "u"), ("ý", "y"), ("þ", "th"),
        ("ÿ", "y"), ("ß", "ss"),
    ],
};
