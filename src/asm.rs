//! Assembling Hack statements into machine code.
//!
//! This module is used to convert parsed statements (`Vec<`[`Stmt`]`>`) into object files
//! holding one 16-bit word per instruction.
//!
//! The assembler module notably consists of:
//! - [`assemble`] and [`assemble_debug`]: The main functions which assemble the statements into an object file.
//! - [`assemble_in_order`]: assembles statements which may have failed to parse,
//!     reporting whichever error comes first in the source
//! - [`SymbolTable`]: a struct holding the symbol table, which stores the addresses of
//!     predefined symbols, labels (computed in the first assembler pass),
//!     and variables (allocated during the second assembler pass)
//! - [`ObjectFile`]: a struct holding the assembled words
//!
//! [`Stmt`]: crate::ast::Stmt

pub mod encoding;

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use tracing::{event, Level};

use crate::ast::{AInstr, Addr, OffsetNewErr, Operand, Stmt, StmtKind};
use crate::err::{AssembleErr, ErrClass};
use crate::parse::{self, ParseErr};

/// The address of the first variable.
pub const VAR_START_ADDR: u32 = 16;

/// Symbols which are defined in every program.
pub const PREDEFINED_SYMBOLS: [(&str, u32); 23] = [
    ("SP", 0), ("LCL", 1), ("ARG", 2), ("THIS", 3), ("THAT", 4),
    ("R0", 0), ("R1", 1), ("R2", 2), ("R3", 3),
    ("R4", 4), ("R5", 5), ("R6", 6), ("R7", 7),
    ("R8", 8), ("R9", 9), ("R10", 10), ("R11", 11),
    ("R12", 12), ("R13", 13), ("R14", 14), ("R15", 15),
    ("SCREEN", 16384), ("KBD", 24576),
];

/// Assembles a list of statements into an object file.
///
/// This function assembles the statements *without* keeping the symbol table
/// in the object file.
///
/// # Example
/// ```
/// use hack_ensemble::parse::parse_ast;
/// use hack_ensemble::asm::assemble;
///
/// let ast = parse_ast(["(LOOP)", "@LOOP", "0;JMP"]).unwrap();
///
/// let obj_file = assemble(ast).unwrap();
/// assert_eq!(obj_file.words(), [0b0000000000000000, 0b1110101010000111]);
///
/// // Symbol table doesn't exist in object file:
/// assert!(obj_file.symbol_table().is_none());
/// ```
pub fn assemble(ast: Vec<Stmt>) -> Result<ObjectFile, AsmErr> {
    let sym = SymbolTable::new(&ast);
    ObjectFile::new(ast, sym, false)
}
/// Assembles a list of statements into an object file.
///
/// This function assembles the statements *and* keeps the final symbol table
/// (including allocated variables) in the object file.
///
/// # Example
/// ```
/// use hack_ensemble::parse::parse_ast;
/// use hack_ensemble::asm::assemble_debug;
///
/// let ast = parse_ast(["@i", "M=0", "(LOOP)", "@LOOP", "0;JMP"]).unwrap();
///
/// let obj_file = assemble_debug(ast).unwrap();
/// let sym = obj_file.symbol_table().unwrap();
/// assert_eq!(sym.lookup("i"), Some(16));
/// assert_eq!(sym.lookup_label("LOOP"), Some(2));
/// ```
pub fn assemble_debug(ast: Vec<Stmt>) -> Result<ObjectFile, AsmErr> {
    let sym = SymbolTable::new(&ast);
    ObjectFile::new(ast, sym, true)
}
/// Assembles statements which may have failed to parse into an object file.
///
/// Errors are reported in source order:
/// a parse error only surfaces once every instruction before it has assembled.
///
/// # Example
/// ```
/// use hack_ensemble::parse::parse_lines;
/// use hack_ensemble::asm::assemble_in_order;
/// use hack_ensemble::err::{AssembleErr, ErrClass};
///
/// // The out of range constant comes before the invalid mnemonic:
/// let err = assemble_in_order(parse_lines(["@32768", "B=M+1"])).unwrap_err();
/// assert_eq!(err.class(), ErrClass::Range);
///
/// let err = assemble_in_order(parse_lines(["B=M+1", "@32768"])).unwrap_err();
/// assert!(matches!(err, AssembleErr::Parse(_)));
/// ```
pub fn assemble_in_order(stmts: Vec<Result<Stmt, ParseErr>>) -> Result<ObjectFile, AssembleErr> {
    let mut sym = SymbolTable::first_pass(stmts.iter().map(Result::as_ref));
    let mut words = Vec::with_capacity(stmts.len());

    for stmt in stmts {
        if let Some(word) = assemble_stmt(&stmt?, &mut sym)? {
            words.push(word);
        }
    }

    Ok(ObjectFile { words, sym: None })
}

/// Assembles one statement in the second pass, returning `None` for labels.
fn assemble_stmt(stmt: &Stmt, sym: &mut SymbolTable) -> Result<Option<u16>, AsmErr> {
    let word = match &stmt.nucleus {
        StmtKind::Label(_) => return Ok(None),
        StmtKind::AInstr(instr) => {
            // Only allocates here. `encode` does the lookup and range check.
            sym.resolve_or_allocate(&instr.0);
            instr.encode(sym)
        },
        StmtKind::CInstr(instr) => Ok(instr.encode()),
    }.map_err(|kind| AsmErr::new(kind, stmt))?;

    event!(Level::DEBUG, "line {}: assembled {stmt} => {word:016b}", stmt.line + 1);
    Ok(Some(word))
}

/// Kinds of errors that can occur from assembling given statements.
///
/// See [`AsmErr`] for this error type with the offending instruction included.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub enum AsmErrKind {
    /// The value of an address instruction does not fit in 15 bits.
    OutOfRange(OffsetNewErr),
    /// A symbol did not have an assigned address.
    CouldNotResolve(String),
}
impl AsmErrKind {
    /// The class of this error.
    pub fn class(&self) -> ErrClass {
        match self {
            AsmErrKind::OutOfRange(_)      => ErrClass::Range,
            AsmErrKind::CouldNotResolve(_) => ErrClass::Resolution,
        }
    }
}
impl std::fmt::Display for AsmErrKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange(e) => {
                let (lo, hi) = e.bounds();
                write!(f, "constant must be in the range ({lo}, {hi})")
            },
            Self::CouldNotResolve(sym) => write!(f, "can not resolve symbol '{sym}'"),
        }
    }
}

/// Error from assembling given statements.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct AsmErr {
    /// The kind of error.
    pub kind: AsmErrKind,
    /// The canonical text of the offending instruction.
    pub instr: String,
    /// The 0-based source line of the offending instruction.
    pub line: usize,
}
impl AsmErr {
    /// Creates a new [`AsmErr`], attributed to the given statement.
    pub fn new(kind: AsmErrKind, stmt: &Stmt) -> Self {
        AsmErr { kind, instr: stmt.text.clone(), line: stmt.line }
    }
}
impl std::fmt::Display for AsmErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unable to assemble instruction '{}': {}", self.instr, self.kind)
    }
}
impl std::error::Error for AsmErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            AsmErrKind::OutOfRange(e) => Some(e),
            _ => None
        }
    }
}
impl crate::err::Error for AsmErr {
    fn line(&self) -> Option<usize> {
        Some(self.line)
    }

    fn help(&self) -> Option<std::borrow::Cow<str>> {
        match &self.kind {
            AsmErrKind::OutOfRange(e)      => e.help(),
            AsmErrKind::CouldNotResolve(_) => Some("variables must be allocated before they are encoded".into()),
        }
    }
}

/// Where a symbol's address came from.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum SymbolKind {
    /// One of [`PREDEFINED_SYMBOLS`].
    Predefined,
    /// A label declaration (bound during the first pass).
    Label,
    /// A variable (allocated during the second pass).
    Variable,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
struct SymbolData {
    addr: u32,
    kind: SymbolKind,
}

/// The symbol table of one assembly run.
///
/// Symbols are added in three layers, and once a symbol has an address, it is never changed:
/// 1. [`PREDEFINED_SYMBOLS`]
/// 2. Labels, bound to the address of the next instruction during the first pass ([`SymbolTable::new`])
/// 3. Variables, allocated from address 16 upwards as they are first referenced
///     during the second pass ([`SymbolTable::resolve_or_allocate`])
///
/// Symbol addresses are only meaningful within a single run,
/// so every assembly creates its own table.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct SymbolTable {
    /// A mapping from symbol to its address.
    symbol_map: HashMap<String, SymbolData>,

    /// The address the next new variable is allocated to.
    next_var: u32,
}

impl SymbolTable {
    /// Creates a symbol table holding only the predefined symbols.
    pub fn predefined() -> Self {
        let symbol_map = PREDEFINED_SYMBOLS.iter()
            .map(|&(name, addr)| (name.to_string(), SymbolData { addr, kind: SymbolKind::Predefined }))
            .collect();

        SymbolTable { symbol_map, next_var: VAR_START_ADDR }
    }

    /// Creates a new symbol table.
    ///
    /// This performs the first assembler pass, binding each label to
    /// the number of instructions which precede it.
    /// If a label is declared more than once (or shadows a predefined symbol),
    /// the first binding is kept.
    ///
    /// ## Example
    /// ```
    /// use hack_ensemble::parse::parse_ast;
    /// use hack_ensemble::asm::SymbolTable;
    ///
    /// let ast = parse_ast([
    ///     "(START)",
    ///     "@1",
    ///     "D=A",
    ///     "(LOOP)",
    ///     "(ALSO_LOOP)",
    ///     "D=D-1;JGT",
    /// ]).unwrap();
    ///
    /// let sym = SymbolTable::new(&ast);
    /// assert_eq!(sym.lookup_label("START"), Some(0));
    /// assert_eq!(sym.lookup_label("LOOP"), Some(2));
    /// assert_eq!(sym.lookup_label("ALSO_LOOP"), Some(2));
    /// assert_eq!(sym.lookup_label("R0"), None);
    /// ```
    pub fn new(stmts: &[Stmt]) -> Self {
        Self::first_pass(stmts.iter().map(Ok::<_, &ParseErr>))
    }

    /// The first assembler pass over statements which may have failed to parse.
    ///
    /// A malformed instruction still takes up an address,
    /// so the labels after it are bound as if it were well-formed.
    fn first_pass<'a>(stmts: impl IntoIterator<Item=Result<&'a Stmt, &'a ParseErr>>) -> Self {
        let mut sym = Self::predefined();
        let mut lc: u32 = 0;

        for stmt in stmts {
            let is_instr = match stmt {
                Ok(stmt) => stmt.is_instr(),
                Err(e) => !parse::is_label(&e.instr),
            };

            if let Ok(Stmt { nucleus: StmtKind::Label(label), .. }) = stmt {
                match sym.symbol_map.entry(label.clone()) {
                    Entry::Occupied(e) => {
                        event!(Level::DEBUG, "ignoring redeclaration of {:?} symbol {label} (bound to {})", e.get().kind, e.get().addr);
                    },
                    Entry::Vacant(e) => {
                        e.insert(SymbolData { addr: lc, kind: SymbolKind::Label });
                    },
                }
            }
            if is_instr {
                lc = lc.saturating_add(1);
            }
        }

        sym
    }

    /// Resolves the value of an operand, allocating a new variable if it is an unknown symbol.
    ///
    /// Literals are returned verbatim without touching the table.
    ///
    /// ## Example
    /// ```
    /// use hack_ensemble::ast::Operand;
    /// use hack_ensemble::asm::SymbolTable;
    ///
    /// let mut sym = SymbolTable::predefined();
    /// let var = |s: &str| Operand::Symbol(s.to_string());
    ///
    /// assert_eq!(sym.resolve_or_allocate(&var("i")), 16);
    /// assert_eq!(sym.resolve_or_allocate(&var("sum")), 17);
    /// assert_eq!(sym.resolve_or_allocate(&var("i")), 16);
    /// assert_eq!(sym.resolve_or_allocate(&var("KBD")), 24576);
    /// assert_eq!(sym.resolve_or_allocate(&Operand::Literal(99)), 99);
    /// assert_eq!(sym.next_variable_addr(), 18);
    /// ```
    pub fn resolve_or_allocate(&mut self, operand: &Operand) -> i64 {
        let name = match operand {
            Operand::Literal(n) => return *n,
            Operand::Symbol(name) => name,
        };

        let data = match self.symbol_map.entry(name.clone()) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                let addr = self.next_var;
                self.next_var = self.next_var.saturating_add(1);
                event!(Level::DEBUG, "allocated variable {name} at {addr}");

                *e.insert(SymbolData { addr, kind: SymbolKind::Variable })
            }
        };

        i64::from(data.addr)
    }

    /// Resolves the value of an operand without allocating,
    /// returning `None` if it is a symbol with no address.
    pub fn resolve(&self, operand: &Operand) -> Option<i64> {
        match operand {
            Operand::Literal(n)   => Some(*n),
            Operand::Symbol(name) => self.lookup(name).map(i64::from),
        }
    }

    /// Gets the address of a given symbol (if it exists).
    pub fn lookup(&self, symbol: &str) -> Option<u32> {
        self.symbol_map.get(symbol).map(|data| data.addr)
    }

    /// Gets the address of a given label (if it exists).
    ///
    /// This does not return predefined symbols or variables.
    pub fn lookup_label(&self, label: &str) -> Option<u32> {
        self.symbol_map.get(label)
            .filter(|data| data.kind == SymbolKind::Label)
            .map(|data| data.addr)
    }

    /// Gets the symbol kind of a given symbol (if it exists).
    pub fn kind(&self, symbol: &str) -> Option<SymbolKind> {
        self.symbol_map.get(symbol).map(|data| data.kind)
    }

    /// The address the next new variable would be allocated to.
    pub fn next_variable_addr(&self) -> u32 {
        self.next_var
    }

    /// Gets an iterable of the mapping from symbols to addresses.
    pub fn symbol_iter(&self) -> impl Iterator<Item=(&str, u32, SymbolKind)> + '_ {
        self.symbol_map.iter()
            .map(|(name, data)| (&**name, data.addr, data.kind))
    }
}

impl AInstr {
    /// Encodes an address instruction into its machine word.
    ///
    /// This does not allocate variables, so an unknown symbol raises
    /// [`AsmErrKind::CouldNotResolve`].
    ///
    /// ## Example
    /// ```
    /// use hack_ensemble::ast::{AInstr, Operand};
    /// use hack_ensemble::asm::{AsmErrKind, SymbolTable};
    ///
    /// let sym = SymbolTable::predefined();
    /// let instr = AInstr(Operand::Symbol("SCREEN".to_string()));
    /// assert_eq!(instr.encode(&sym), Ok(0b0100000000000000));
    ///
    /// let instr = AInstr(Operand::Symbol("x".to_string()));
    /// assert!(matches!(instr.encode(&sym), Err(AsmErrKind::CouldNotResolve(_))));
    /// ```
    pub fn encode(&self, sym: &SymbolTable) -> Result<u16, AsmErrKind> {
        let value = sym.resolve(&self.0)
            .ok_or_else(|| AsmErrKind::CouldNotResolve(self.0.to_string()))?;
        let addr = Addr::from_value(value)
            .map_err(AsmErrKind::OutOfRange)?;

        Ok(AInstr::word(addr))
    }
}

/// An object file.
///
/// This is the final product after a source unit is fully assembled:
/// one machine word per instruction, in source order.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct ObjectFile {
    /// The assembled words.
    words: Vec<u16>,

    /// Debug symbols.
    sym: Option<SymbolTable>,
}
impl ObjectFile {
    /// Creates an empty object file.
    pub fn empty() -> Self {
        ObjectFile { words: vec![], sym: None }
    }

    /// Creates an object file from already assembled words.
    pub fn from_words(words: Vec<u16>) -> Self {
        ObjectFile { words, sym: None }
    }

    /// Creates a new object file from statements and the first pass symbol table.
    fn new(ast: Vec<Stmt>, mut sym: SymbolTable, debug: bool) -> Result<Self, AsmErr> {
        let mut words = Vec::with_capacity(ast.len());

        // PASS 2
        for stmt in &ast {
            if let Some(word) = assemble_stmt(stmt, &mut sym)? {
                words.push(word);
            }
        }

        Ok(Self {
            words,
            sym: debug.then_some(sym),
        })
    }

    /// The assembled words.
    pub fn words(&self) -> &[u16] {
        &self.words
    }

    /// The number of words in the object file.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the object file has no words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Gets the symbol table if it is present in the object file.
    pub fn symbol_table(&self) -> Option<&SymbolTable> {
        self.sym.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use crate::asm::{AsmErrKind, SymbolKind};
    use crate::ast::{AInstr, OffsetNewErr, Operand};
    use crate::err::ErrClass;
    use crate::parse::parse_ast;

    use super::{assemble, assemble_debug, AsmErr, ObjectFile, SymbolTable};

    fn assemble_src(src: &[&str]) -> Result<ObjectFile, AsmErr> {
        let ast = parse_ast(src).unwrap();
        assemble_debug(ast)
    }
    fn assert_asm_fail<T: std::fmt::Debug>(r: Result<T, AsmErr>, kind: AsmErrKind) {
        assert_eq!(r.unwrap_err().kind, kind);
    }

    #[test]
    fn test_sym_basic() {
        let src = [
            "(A)",
            "@0",
            "D=A",
            "(C)",
            "@C",
            "(D)",
            "D;JGT",
            "@1",
            "@2",
            "@3",
            "(E)",
            "@E",
            "0;JMP",
            "(B)",
        ];

        let obj = assemble_src(&src).unwrap();
        let sym = obj.symbol_table().unwrap();
        assert_eq!(sym.lookup_label("A"), Some(0));
        assert_eq!(sym.lookup_label("C"), Some(2));
        assert_eq!(sym.lookup_label("D"), Some(3));
        assert_eq!(sym.lookup_label("E"), Some(7));
        assert_eq!(sym.lookup_label("B"), Some(9));
        assert_eq!(obj.len(), 9);
    }

    #[test]
    fn test_sym_duplicate_labels() {
        let src = [
            "(LOOP)",
            "@LOOP",
            "(LOOP)",
            "0;JMP",
            "(R1)",
            "@R1",
        ];
        let obj = assemble_src(&src).unwrap();
        let sym = obj.symbol_table().unwrap();

        // First binding wins
        assert_eq!(sym.lookup_label("LOOP"), Some(0));
        // Predefined symbols are not overwritten
        assert_eq!(sym.lookup("R1"), Some(1));
        assert_eq!(sym.kind("R1"), Some(SymbolKind::Predefined));
        assert_eq!(obj.words(), [0, 0b1110101010000111, 1]);
    }

    #[test]
    fn test_variable_allocation() {
        let src = [
            "@i",
            "M=1",
            "@sum",
            "M=0",
            "@i",
            "D=M",
            "@100",
            "@LOOP",
            "(LOOP)",
            "@n",
            "@SCREEN",
            "@sum",
        ];
        let obj = assemble_src(&src).unwrap();
        let sym = obj.symbol_table().unwrap();

        assert_eq!(sym.lookup("i"), Some(16));
        assert_eq!(sym.lookup("sum"), Some(17));
        assert_eq!(sym.lookup("n"), Some(18));
        assert_eq!(sym.kind("n"), Some(SymbolKind::Variable));
        assert_eq!(sym.lookup_label("LOOP"), Some(8));
        assert_eq!(sym.next_variable_addr(), 19);

        let mut vars: Vec<_> = sym.symbol_iter()
            .filter(|&(_, _, kind)| kind == SymbolKind::Variable)
            .map(|(name, addr, _)| (name, addr))
            .collect();
        vars.sort_by_key(|&(_, addr)| addr);
        assert_eq!(vars, [("i", 16), ("sum", 17), ("n", 18)]);
        assert_eq!(sym.symbol_iter().filter(|&(_, _, kind)| kind == SymbolKind::Predefined).count(), 23);

        assert_eq!(obj.words(), [16, 0b1110111111001000, 17, 0b1110101010001000, 16, 0b1111110000010000, 100, 8, 18, 16384, 17]);
    }

    #[test]
    fn test_symbols_are_case_sensitive() {
        let obj = assemble_src(&["@sp", "@SP", "@Sp"]).unwrap();
        assert_eq!(obj.words(), [16, 0, 17]);
    }

    #[test]
    fn test_out_of_range() {
        let err = assemble_src(&["@1", "@32768"]).unwrap_err();
        assert_eq!(err.kind, AsmErrKind::OutOfRange(OffsetNewErr::CannotFitUnsigned(15)));
        assert_eq!(err.kind.class(), ErrClass::Range);
        assert_eq!(err.line, 1);
        assert_eq!(err.to_string(), "unable to assemble instruction '@32768': constant must be in the range (0, 32767)");

        assert_asm_fail(assemble_src(&["@-1"]), AsmErrKind::OutOfRange(OffsetNewErr::CannotFitUnsigned(15)));
        assert_asm_fail(assemble_src(&["@99999"]), AsmErrKind::OutOfRange(OffsetNewErr::CannotFitUnsigned(15)));

        assert_eq!(assemble_src(&["@32767"]).unwrap().words(), [0x7FFF]);
    }

    #[test]
    fn test_label_out_of_range() {
        let mut src = vec!["D"; 32768];
        src.extend(["(END)", "@END"]);

        assert_asm_fail(assemble_src(&src), AsmErrKind::OutOfRange(OffsetNewErr::CannotFitUnsigned(15)));
    }

    #[test]
    fn test_unresolved_symbol() {
        let sym = SymbolTable::predefined();
        let instr = AInstr(Operand::Symbol("undefinedVar".to_string()));
        let kind = instr.encode(&sym).unwrap_err();

        assert_eq!(kind, AsmErrKind::CouldNotResolve("undefinedVar".to_string()));
        assert_eq!(kind.class(), ErrClass::Resolution);

        // The error cites the instruction it came from
        let stmt = parse_ast(["@0", "@undefinedVar"]).unwrap().remove(1);
        let err = AsmErr::new(kind, &stmt);
        assert_eq!(err.instr, "@undefinedVar");
        assert_eq!(err.line, 1);
        assert!(err.to_string().contains("'@undefinedVar'"), "{err}");

        // The normal path allocates instead.
        assert_eq!(assemble_src(&["@undefinedVar"]).unwrap().words(), [16]);
    }

    #[test]
    fn test_predefined_symbols() {
        let src = [
            "@SP", "@LCL", "@ARG", "@THIS", "@THAT",
            "@R0", "@R5", "@R10", "@R15",
            "@SCREEN", "@KBD",
        ];
        let obj = assemble_src(&src).unwrap();
        assert_eq!(obj.words(), [0, 1, 2, 3, 4, 0, 5, 10, 15, 16384, 24576]);
    }

    #[test]
    fn test_assemble_is_repeatable() {
        let src = ["@x", "M=1", "@y", "M=D", "(L)", "@L", "0;JMP"];

        let first = assemble(parse_ast(src).unwrap()).unwrap();
        let second = assemble(parse_ast(src).unwrap()).unwrap();
        assert_eq!(first, second);
        assert!(first.symbol_table().is_none());
    }

    #[test]
    fn test_empty() {
        let obj = assemble_src(&[]).unwrap();
        assert!(obj.is_empty());
        assert_eq!(obj.symbol_table(), Some(&SymbolTable::predefined()));
        assert_eq!(assemble(vec![]).unwrap(), ObjectFile::empty());
    }

    #[test]
    fn test_in_order_errors() {
        use crate::err::AssembleErr;
        use crate::parse::parse_lines;
        use super::assemble_in_order;

        // Well-formed sources assemble exactly as with `assemble`
        let src = ["@x", "M=1", "(L)", "@L", "0;JMP"];
        let obj = assemble_in_order(parse_lines(src)).unwrap();
        assert_eq!(obj, assemble(parse_ast(src).unwrap()).unwrap());

        // The earlier error wins, whichever stage it comes from
        let err = assemble_in_order(parse_lines(["@0", "@undefined", "@-1", "X=1"])).unwrap_err();
        assert_eq!(err.class(), ErrClass::Range);
        assert_eq!(err.instr(), "@-1");

        let err = assemble_in_order(parse_lines(["@0", "X=1", "@-1"])).unwrap_err();
        assert!(matches!(err, AssembleErr::Parse(_)));
        assert_eq!(err.instr(), "X=1");

        // A malformed label is reported where it appears
        let err = assemble_in_order(parse_lines(["@1", "(1ABEL)", "@32768"])).unwrap_err();
        assert_eq!(err.instr(), "(1ABEL)");
    }

    #[test]
    fn test_first_pass_counts_malformed_instrs() {
        use crate::parse::parse_lines;

        let stmts = parse_lines(["X=1", "(BAD", "(12)", "(AFTER)"]);
        let sym = SymbolTable::first_pass(stmts.iter().map(Result::as_ref));
        assert_eq!(sym.lookup_label("AFTER"), Some(2));
        assert_eq!(sym.lookup("12"), None);
    }
}
