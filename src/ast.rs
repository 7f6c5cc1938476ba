//! Components relating to the abstract syntax tree (AST)
//! used in representing Hack assembly instructions.
//!
//! A source unit is represented as a list of [`Stmt`]s, each of which is one of:
//! - a label declaration (`(NAME)`),
//! - an address instruction ([`AInstr`], `@value`),
//! - or a computation instruction ([`CInstr`], `dest=comp;jump`).
//!
//! The fragment tables which map computation mnemonics to their opcode bits
//! are held by the [`Dest`], [`Comp`], and [`Jump`] enums.

/// An unsigned value which fits in `N` bits.
///
/// Address instructions carry a 15-bit value (see [`Addr`]).
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Offset<const N: u32>(u16);

/// The value of an address instruction.
pub type Addr = Offset<15>;

impl<const N: u32> std::fmt::Display for Offset<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Errors that can result from trying to create an [`Offset`].
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum OffsetNewErr {
    /// The provided value cannot fit an unsigned integer of the given bit size.
    CannotFitUnsigned(u32),
}
impl OffsetNewErr {
    /// The inclusive range of values which would have fit.
    pub fn bounds(&self) -> (u32, u32) {
        match *self {
            OffsetNewErr::CannotFitUnsigned(n) => (0, (1 << n) - 1),
        }
    }
}
impl std::fmt::Display for OffsetNewErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OffsetNewErr::CannotFitUnsigned(n) => write!(f, "value is too big for unsigned {n}-bit integer"),
        }
    }
}
impl std::error::Error for OffsetNewErr {}
impl crate::err::Error for OffsetNewErr {
    fn help(&self) -> Option<std::borrow::Cow<str>> {
        let (lo, hi) = self.bounds();
        match self {
            OffsetNewErr::CannotFitUnsigned(n) => Some(format!("the range for an unsigned {n}-bit integer is [{lo}, {hi}]").into()),
        }
    }
}

impl<const N: u32> Offset<N> {
    /// Creates a new offset value.
    /// This must fit within `N` bits of the representation, otherwise an error is raised.
    ///
    /// # Examples
    /// ```
    /// # use hack_ensemble::ast::Addr;
    /// assert!(Addr::new(0).is_ok());
    /// assert!(Addr::new(32767).is_ok());
    /// assert!(Addr::new(32768).is_err());
    /// ```
    ///
    /// # Panics
    ///
    /// This will panic if `N` is larger than 16.
    pub fn new(n: u16) -> Result<Self, OffsetNewErr> {
        assert!(N <= u16::BITS, "bit size {N} exceeds size of backing ({})", u16::BITS);
        match u32::from(n) >> N == 0 {
            true  => Ok(Offset(n)),
            false => Err(OffsetNewErr::CannotFitUnsigned(N)),
        }
    }

    /// Creates a new offset from any integer value,
    /// raising an error if it is negative or does not fit within `N` bits.
    ///
    /// # Examples
    /// ```
    /// # use hack_ensemble::ast::Addr;
    /// assert_eq!(Addr::from_value(24576).unwrap().get(), 24576);
    /// assert!(Addr::from_value(-1).is_err());
    /// assert!(Addr::from_value(99999).is_err());
    /// ```
    pub fn from_value(n: i64) -> Result<Self, OffsetNewErr> {
        u16::try_from(n)
            .map_err(|_| OffsetNewErr::CannotFitUnsigned(N))
            .and_then(Self::new)
    }

    /// Gets the value of the offset.
    pub fn get(&self) -> u16 {
        self.0
    }
}

/// The three subfields of a computation instruction.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Field {
    /// The destination clause (before `=`).
    Dest,
    /// The computation clause.
    Comp,
    /// The jump clause (after `;`).
    Jump,
}
impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Dest => f.write_str("dest"),
            Field::Comp => f.write_str("comp"),
            Field::Jump => f.write_str("jump"),
        }
    }
}

/// A mnemonic which does not appear in the fragment table of its field.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct MnemonicErr {
    /// The field the mnemonic appeared in.
    pub field: Field,
    /// The offending mnemonic.
    pub mnemonic: String,
}
impl std::fmt::Display for MnemonicErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "instruction mnemonic '{}' is not valid", self.mnemonic)
    }
}
impl std::error::Error for MnemonicErr {}
impl crate::err::Error for MnemonicErr {
    fn help(&self) -> Option<std::borrow::Cow<str>> {
        let valid: Vec<_> = match self.field {
            Field::Dest => Dest::ALL.iter().map(|m| m.mnemonic()).collect(),
            Field::Comp => Comp::ALL.iter().map(|m| m.mnemonic()).collect(),
            Field::Jump => Jump::ALL.iter().map(|m| m.mnemonic()).collect(),
        };
        Some(format!("valid {} mnemonics are: {}", self.field, valid.join(", ")).into())
    }
}

macro_rules! fragment_table {
    ($(#[$m:meta])* $Name:ident ($field:ident, $bits:literal) {
        $($variant:ident => $mnemonic:literal = $code:literal),+ $(,)?
    }) => {
        $(#[$m])*
        #[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
        pub enum $Name {
            $(
                #[allow(missing_docs)]
                $variant
            ),+
        }

        impl $Name {
            /// The width of this fragment in an instruction word.
            pub const BITS: u32 = $bits;
            /// Every entry of the table.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The opcode fragment of this mnemonic.
            pub fn bits(self) -> u16 {
                match self {
                    $(Self::$variant => $code),+
                }
            }

            /// The mnemonic as it appears in source.
            pub fn mnemonic(self) -> &'static str {
                match self {
                    $(Self::$variant => $mnemonic),+
                }
            }

            /// Reverse lookup of an opcode fragment.
            pub fn from_bits(bits: u16) -> Option<Self> {
                Self::ALL.iter().copied().find(|m| m.bits() == bits)
            }
        }

        impl std::str::FromStr for $Name {
            type Err = MnemonicErr;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($mnemonic => Ok(Self::$variant)),+,
                    _ => Err(MnemonicErr { field: Field::$field, mnemonic: s.to_string() })
                }
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.mnemonic())
            }
        }
    };
}

fragment_table! {
    /// The destination of a computation. An absent destination encodes as `000`.
    Dest (Dest, 3) {
        M   => "M"   = 0b001,
        D   => "D"   = 0b010,
        MD  => "MD"  = 0b011,
        A   => "A"   = 0b100,
        AM  => "AM"  = 0b101,
        AD  => "AD"  = 0b110,
        AMD => "AMD" = 0b111,
    }
}

fragment_table! {
    /// An ALU computation.
    ///
    /// The fragment is the `a` bit (select `M` instead of `A`) followed by the six control bits.
    Comp (Comp, 7) {
        Zero      => "0"   = 0b0_101010,
        One       => "1"   = 0b0_111111,
        NegOne    => "-1"  = 0b0_111010,
        D         => "D"   = 0b0_001100,
        A         => "A"   = 0b0_110000,
        NotD      => "!D"  = 0b0_001101,
        NotA      => "!A"  = 0b0_110001,
        NegD      => "-D"  = 0b0_001111,
        NegA      => "-A"  = 0b0_110011,
        DPlusOne  => "D+1" = 0b0_011111,
        APlusOne  => "A+1" = 0b0_110111,
        DMinusOne => "D-1" = 0b0_001110,
        AMinusOne => "A-1" = 0b0_110010,
        DPlusA    => "D+A" = 0b0_000010,
        DMinusA   => "D-A" = 0b0_010011,
        AMinusD   => "A-D" = 0b0_000111,
        DAndA     => "D&A" = 0b0_000000,
        DOrA      => "D|A" = 0b0_010101,
        M         => "M"   = 0b1_110000,
        NotM      => "!M"  = 0b1_110001,
        NegM      => "-M"  = 0b1_110011,
        MPlusOne  => "M+1" = 0b1_110111,
        MMinusOne => "M-1" = 0b1_110010,
        DPlusM    => "D+M" = 0b1_000010,
        DMinusM   => "D-M" = 0b1_010011,
        MMinusD   => "M-D" = 0b1_000111,
        DAndM     => "D&M" = 0b1_000000,
        DOrM      => "D|M" = 0b1_010101,
    }
}

fragment_table! {
    /// A jump condition. An absent jump encodes as `000`.
    Jump (Jump, 3) {
        JGT => "JGT" = 0b001,
        JEQ => "JEQ" = 0b010,
        JGE => "JGE" = 0b011,
        JLT => "JLT" = 0b100,
        JNE => "JNE" = 0b101,
        JLE => "JLE" = 0b110,
        JMP => "JMP" = 0b111,
    }
}

/// The opcode bits prefixed to every computation instruction.
pub const C_INSTR_OPCODE: u16 = 0b111;

/// The operand of an address instruction.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum Operand {
    /// An absolute value (e.g. `@21`). Range is checked during assembly.
    Literal(i64),
    /// A predefined symbol, label, or variable (e.g. `@LOOP`).
    Symbol(String),
}
impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Literal(n)   => std::fmt::Display::fmt(n, f),
            Operand::Symbol(name) => f.write_str(name),
        }
    }
}

/// An address instruction (`@value`).
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct AInstr(pub Operand);
impl AInstr {
    /// Creates the machine word for an address instruction of a given value.
    pub fn word(addr: Addr) -> u16 {
        // The leading opcode bit is 0.
        addr.get()
    }
}
impl std::fmt::Display for AInstr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.0)
    }
}

/// A computation instruction (`dest=comp;jump`).
///
/// Both `dest` and `jump` are optional.
/// An instruction with neither (e.g. `D+1`) is valid and simply discards its result.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct CInstr {
    /// The destination, if present.
    pub dest: Option<Dest>,
    /// The computation.
    pub comp: Comp,
    /// The jump condition, if present.
    pub jump: Option<Jump>,
}
impl CInstr {
    /// Encodes this instruction into its machine word.
    ///
    /// # Example
    /// ```
    /// use hack_ensemble::ast::CInstr;
    ///
    /// let instr: CInstr = "0;JMP".parse().unwrap();
    /// assert_eq!(instr.encode(), 0b111_0101010_000_111);
    /// ```
    pub fn encode(&self) -> u16 {
        let dest = self.dest.map_or(0, Dest::bits);
        let jump = self.jump.map_or(0, Jump::bits);

        (C_INSTR_OPCODE << 13)
            | (self.comp.bits() << 6)
            | (dest << 3)
            | jump
    }

    /// Decodes a machine word into a computation instruction,
    /// returning `None` if the word is not a valid computation instruction.
    pub fn decode(word: u16) -> Option<Self> {
        if word >> 13 != C_INSTR_OPCODE {
            return None;
        }

        let comp = Comp::from_bits((word >> 6) & 0b1111111)?;
        let dest = match (word >> 3) & 0b111 {
            0 => None,
            d => Some(Dest::from_bits(d)?),
        };
        let jump = match word & 0b111 {
            0 => None,
            j => Some(Jump::from_bits(j)?),
        };

        Some(CInstr { dest, comp, jump })
    }
}
impl std::str::FromStr for CInstr {
    type Err = MnemonicErr;

    /// Parses the `dest=comp;jump` grammar.
    /// `=` only appears after the destination and `;` only appears before the jump.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rest, jump) = match s.split_once(';') {
            Some((rest, jump)) => (rest, Some(jump)),
            None => (s, None),
        };
        let (dest, comp) = match rest.split_once('=') {
            Some((dest, comp)) => (Some(dest), comp),
            None => (None, rest),
        };

        let dest = dest.map(str::parse).transpose()?;
        let comp = comp.parse()?;
        let jump = jump.map(str::parse).transpose()?;

        Ok(CInstr { dest, comp, jump })
    }
}
impl std::fmt::Display for CInstr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(dest) = self.dest {
            write!(f, "{dest}=")?;
        }
        f.write_str(self.comp.mnemonic())?;
        if let Some(jump) = self.jump {
            write!(f, ";{jump}")?;
        }
        Ok(())
    }
}

/// The kinds of statements in a Hack source unit.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum StmtKind {
    /// A label declaration. It names the address of the next instruction and emits no word.
    Label(String),
    /// An address instruction.
    AInstr(AInstr),
    /// A computation instruction.
    CInstr(CInstr),
}

/// A statement, with the source text it was parsed from.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct Stmt {
    /// The content of the statement.
    pub nucleus: StmtKind,
    /// The canonical (comment-stripped, trimmed) source text.
    pub text: String,
    /// The 0-based line of the source this statement came from.
    pub line: usize,
}
impl Stmt {
    /// Whether this statement emits a word.
    pub fn is_instr(&self) -> bool {
        !matches!(self.nucleus, StmtKind::Label(_))
    }
}
impl std::fmt::Display for Stmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.nucleus {
            StmtKind::Label(name)   => write!(f, "({name})"),
            StmtKind::AInstr(instr) => write!(f, "{instr}"),
            StmtKind::CInstr(instr) => write!(f, "{instr}"),
        }
    }
}
