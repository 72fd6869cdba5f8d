//! Synthetic mdebug symbol tables for integration tests.
//!
//! [`build_image`] lays a table out byte by byte: symbolic header, file
//! descriptors, local symbols, then each file's string table. All offsets
//! written into the table are absolute, as in a real executable.

#![allow(dead_code)]

pub const ST_NIL: u8 = 0;
pub const ST_GLOBAL: u8 = 1;
pub const ST_STATIC: u8 = 2;
pub const ST_PARAM: u8 = 3;
pub const ST_LOCAL: u8 = 4;
pub const ST_LABEL: u8 = 5;
pub const ST_PROC: u8 = 6;
pub const ST_BLOCK: u8 = 7;
pub const ST_END: u8 = 8;
pub const ST_TYPEDEF: u8 = 10;
pub const ST_FILE: u8 = 11;
pub const ST_STATICPROC: u8 = 14;

pub const SC_NIL: u8 = 0;
pub const SC_TEXT: u8 = 1;
pub const SC_DATA: u8 = 2;
pub const SC_BSS: u8 = 3;
pub const SC_REGISTER: u8 = 4;
pub const SC_ABS: u8 = 5;
pub const SC_INFO: u8 = 11;

const HEADER_SIZE: usize = 0x60;
const FILE_DESCRIPTOR_SIZE: usize = 0x48;
const SYMBOL_SIZE: usize = 0xc;
const STABS_MAGIC: u32 = 0x8f300;

#[derive(Debug, Clone)]
pub struct TestSymbol
{
    pub name: String,
    pub value: i32,
    pub st: u8,
    pub sc: u8,
    pub index: u32,
}

impl TestSymbol
{
    pub fn new(name: &str, st: u8, sc: u8, value: i32) -> Self
    {
        Self {
            name: name.to_string(),
            value,
            st,
            sc,
            index: 0,
        }
    }

    pub fn stabs(name: &str, code: u32) -> Self
    {
        Self {
            name: name.to_string(),
            value: 0,
            st: ST_NIL,
            sc: SC_INFO,
            index: STABS_MAGIC + code,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TestFile
{
    pub path: String,
    pub address: u32,
    pub big_endian: bool,
    pub symbols: Vec<TestSymbol>,
}

impl TestFile
{
    pub fn new(path: &str) -> Self
    {
        Self {
            path: path.to_string(),
            address: 0,
            big_endian: false,
            symbols: Vec::new(),
        }
    }

    pub fn at(mut self, address: u32) -> Self
    {
        self.address = address;
        self
    }

    pub fn big_endian(mut self) -> Self
    {
        self.big_endian = true;
        self
    }

    pub fn symbol(mut self, name: &str, st: u8, sc: u8, value: i32) -> Self
    {
        self.symbols.push(TestSymbol::new(name, st, sc, value));
        self
    }

    pub fn push(mut self, symbol: TestSymbol) -> Self
    {
        self.symbols.push(symbol);
        self
    }
}

/// A file's string table. Equal strings share one offset, so a symbol named
/// after the file's path gets the path's offset.
struct Strings
{
    bytes: Vec<u8>,
    offsets: Vec<(String, u32)>,
}

impl Strings
{
    fn new() -> Self
    {
        Self {
            bytes: Vec::new(),
            offsets: Vec::new(),
        }
    }

    fn intern(&mut self, string: &str) -> u32
    {
        if let Some((_, offset)) = self.offsets.iter().find(|(existing, _)| existing == string) {
            return *offset;
        }
        let offset = u32::try_from(self.bytes.len()).unwrap();
        self.bytes.extend_from_slice(string.as_bytes());
        self.bytes.push(0);
        self.offsets.push((string.to_string(), offset));
        offset
    }
}

fn put_i32(out: &mut Vec<u8>, value: usize)
{
    out.extend_from_slice(&i32::try_from(value).unwrap().to_le_bytes());
}

/// Build an image with the symbol table starting at `section_offset`.
pub fn build_image(section_offset: usize, files: &[TestFile]) -> Vec<u8>
{
    let symbol_count: usize = files.iter().map(|file| file.symbols.len()).sum();
    let fd_offset = section_offset + HEADER_SIZE;
    let symbols_offset = fd_offset + files.len() * FILE_DESCRIPTOR_SIZE;
    let strings_offset = symbols_offset + symbol_count * SYMBOL_SIZE;

    let mut tables: Vec<(Strings, u32, Vec<u32>)> = Vec::new();
    for file in files {
        let mut strings = Strings::new();
        let path = strings.intern(&file.path);
        let isses = file.symbols.iter().map(|symbol| strings.intern(&symbol.name)).collect();
        tables.push((strings, path, isses));
    }
    let strings_size: usize = tables.iter().map(|(strings, _, _)| strings.bytes.len()).sum();

    let mut image = vec![0u8; section_offset];

    // Symbolic header.
    image.extend_from_slice(&0x7009u16.to_le_bytes());
    image.extend_from_slice(&0x0001u16.to_le_bytes());
    for _ in 0..7 {
        put_i32(&mut image, 0);
    }
    put_i32(&mut image, symbol_count);
    put_i32(&mut image, symbols_offset);
    for _ in 0..4 {
        put_i32(&mut image, 0);
    }
    put_i32(&mut image, strings_size);
    put_i32(&mut image, strings_offset);
    put_i32(&mut image, 0);
    put_i32(&mut image, 0);
    put_i32(&mut image, files.len());
    put_i32(&mut image, fd_offset);
    for _ in 0..4 {
        put_i32(&mut image, 0);
    }
    assert_eq!(image.len(), fd_offset);

    // File descriptors.
    let mut isym_base = 0;
    let mut strings_base = 0;
    for (file, (strings, path, _)) in files.iter().zip(&tables) {
        image.extend_from_slice(&file.address.to_le_bytes());
        image.extend_from_slice(&path.to_le_bytes());
        put_i32(&mut image, strings_base);
        put_i32(&mut image, strings.bytes.len());
        put_i32(&mut image, isym_base);
        put_i32(&mut image, file.symbols.len());
        for _ in 0..4 {
            put_i32(&mut image, 0);
        }
        image.extend_from_slice(&0i16.to_le_bytes());
        image.extend_from_slice(&0i16.to_le_bytes());
        for _ in 0..4 {
            put_i32(&mut image, 0);
        }
        let bits: u32 = if file.big_endian { 1 << 7 } else { 0 };
        image.extend_from_slice(&bits.to_le_bytes());
        put_i32(&mut image, 0);
        put_i32(&mut image, 0);

        isym_base += file.symbols.len();
        strings_base += strings.bytes.len();
    }
    assert_eq!(image.len(), symbols_offset);

    // Local symbols.
    for (file, (_, _, isses)) in files.iter().zip(&tables) {
        for (symbol, iss) in file.symbols.iter().zip(isses) {
            let bits = u32::from(symbol.st & 0x3f) | (u32::from(symbol.sc & 0x1f) << 6) | (symbol.index << 12);
            image.extend_from_slice(&iss.to_le_bytes());
            image.extend_from_slice(&symbol.value.to_le_bytes());
            image.extend_from_slice(&bits.to_le_bytes());
        }
    }
    assert_eq!(image.len(), strings_offset);

    // Strings.
    for (strings, _, _) in &tables {
        image.extend_from_slice(&strings.bytes);
    }
    image
}
