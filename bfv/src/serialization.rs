use crate::ciphertext::Ciphertext;
use crate::keys::{GaloisKeys, PublicKey, RelinKeys, SecretKey, SwitchingKey};
use crate::parameters::MAX_LOG_N;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use fnv::FnvHashMap;
use math::poly::PolyRNS;
use std::io::{Error, ErrorKind, Read, Result, Write};

/// Serialize a key or ciphertext to a byte stream.
///
/// Every object starts with the header `magic: u32`, `kind: u8`,
/// `parms_id: u64`, followed by a type-specific body documented on each
/// implementor. All multi-byte integers are written in little-endian order.
pub trait WriterTo {
    /// Writes the complete serialized representation to `writer`.
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()>;
}

/// Deserialize a key or ciphertext from a byte stream.
///
/// `self` is only overwritten after the whole object was read, so an I/O
/// error leaves the receiver unchanged. The header is checked for the
/// expected kind, the `parms_id` is checked later against a context.
pub trait ReaderFrom {
    /// Reads and overwrites `self` from `reader`.
    fn read_from<R: Read>(&mut self, reader: &mut R) -> Result<()>;
}

pub const MAGIC: u32 = 0x5346_5642;

pub const KIND_SECRET_KEY: u8 = 1;
pub const KIND_PUBLIC_KEY: u8 = 2;
pub const KIND_RELIN_KEYS: u8 = 3;
pub const KIND_GALOIS_KEYS: u8 = 4;
pub const KIND_CIPHERTEXT: u8 = 5;

// allocation bounds on untrusted lengths
const MAX_N: usize = 1 << MAX_LOG_N;
const MAX_PRIMES: usize = 32;
const MAX_DIGITS: usize = 64;
const MAX_CIPHERTEXT_SIZE: usize = 3;

fn invalid(msg: String) -> Error {
    Error::new(ErrorKind::InvalidData, msg)
}

fn write_header<W: Write>(writer: &mut W, kind: u8, parms_id: u64) -> Result<()> {
    writer.write_u32::<LittleEndian>(MAGIC)?;
    writer.write_u8(kind)?;
    writer.write_u64::<LittleEndian>(parms_id)
}

/// Returns the parms_id of the header.
fn read_header<R: Read>(reader: &mut R, kind: u8) -> Result<u64> {
    let magic: u32 = reader.read_u32::<LittleEndian>()?;
    if magic != MAGIC {
        return Err(invalid(format!("invalid magic {:#010x}", magic)));
    }
    let found: u8 = reader.read_u8()?;
    if found != kind {
        return Err(invalid(format!("expected object kind {}, found {}", kind, found)));
    }
    reader.read_u64::<LittleEndian>()
}

fn read_len<R: Read>(reader: &mut R, max: usize, what: &str) -> Result<usize> {
    let len: usize = reader.read_u32::<LittleEndian>()? as usize;
    if len > max {
        return Err(invalid(format!("{}={} exceeds {}", what, len, max)));
    }
    Ok(len)
}

fn read_n<R: Read>(reader: &mut R) -> Result<usize> {
    let n: usize = read_len(reader, MAX_N, "n")?;
    if n == 0 || n & (n - 1) != 0 {
        return Err(invalid(format!("n={} is not a power of two", n)));
    }
    Ok(n)
}

/// `primes: u32`, `n: u32`, then `primes * n` coefficients as u64.
fn write_polyrns<W: Write>(writer: &mut W, a: &PolyRNS<u64>) -> Result<()> {
    writer.write_u32::<LittleEndian>(a.0.len() as u32)?;
    writer.write_u32::<LittleEndian>(a.0.first().map(|p| p.n()).unwrap_or(0) as u32)?;
    for poly in a.0.iter() {
        for x in poly.0.iter() {
            writer.write_u64::<LittleEndian>(*x)?;
        }
    }
    Ok(())
}

fn read_polyrns<R: Read>(reader: &mut R) -> Result<PolyRNS<u64>> {
    let primes: usize = read_len(reader, MAX_PRIMES, "primes")?;
    if primes == 0 {
        return Err(invalid("empty polynomial".to_string()));
    }
    let n: usize = read_n(reader)?;
    let mut a: PolyRNS<u64> = PolyRNS::new(n, primes - 1);
    for poly in a.0.iter_mut() {
        reader.read_u64_into::<LittleEndian>(&mut poly.0)?;
    }
    Ok(a)
}

/// `decomposition_bits: u32`, `primes: u32`, then per prime `digits: u32`
/// followed by the (b, a) polynomials of each digit.
fn write_switching_key<W: Write>(writer: &mut W, key: &SwitchingKey) -> Result<()> {
    writer.write_u32::<LittleEndian>(key.decomposition_bits as u32)?;
    writer.write_u32::<LittleEndian>(key.value.len() as u32)?;
    for rows in key.value.iter() {
        writer.write_u32::<LittleEndian>(rows.len() as u32)?;
        for row in rows.iter() {
            write_polyrns(writer, &row[0])?;
            write_polyrns(writer, &row[1])?;
        }
    }
    Ok(())
}

fn read_switching_key<R: Read>(reader: &mut R) -> Result<SwitchingKey> {
    let decomposition_bits: usize = read_len(reader, 60, "decomposition_bits")?;
    let primes: usize = read_len(reader, MAX_PRIMES, "primes")?;
    let mut value: Vec<Vec<[PolyRNS<u64>; 2]>> = Vec::with_capacity(primes);
    for _ in 0..primes {
        let digits: usize = read_len(reader, MAX_DIGITS, "digits")?;
        let mut rows: Vec<[PolyRNS<u64>; 2]> = Vec::with_capacity(digits);
        for _ in 0..digits {
            let b: PolyRNS<u64> = read_polyrns(reader)?;
            let a: PolyRNS<u64> = read_polyrns(reader)?;
            rows.push([b, a]);
        }
        value.push(rows);
    }
    Ok(SwitchingKey {
        decomposition_bits,
        value,
    })
}

/// Body: `depth: u8`, `size: u32`, then `size` polynomials.
impl WriterTo for Ciphertext {
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_header(writer, KIND_CIPHERTEXT, self.parms_id)?;
        writer.write_u8(self.depth)?;
        writer.write_u32::<LittleEndian>(self.value.len() as u32)?;
        self.value.iter().try_for_each(|p| write_polyrns(writer, p))
    }
}

impl ReaderFrom for Ciphertext {
    fn read_from<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        let parms_id: u64 = read_header(reader, KIND_CIPHERTEXT)?;
        let depth: u8 = reader.read_u8()?;
        let size: usize = read_len(reader, MAX_CIPHERTEXT_SIZE, "size")?;
        let value: Vec<PolyRNS<u64>> = (0..size)
            .map(|_| read_polyrns(reader))
            .collect::<Result<Vec<PolyRNS<u64>>>>()?;
        self.value = value;
        self.parms_id = parms_id;
        self.depth = depth;
        Ok(())
    }
}

/// Body: `n: u32`, then `n` ternary coefficients as i8.
impl WriterTo for SecretKey {
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_header(writer, KIND_SECRET_KEY, self.parms_id)?;
        writer.write_u32::<LittleEndian>(self.coeffs.len() as u32)?;
        self.coeffs.iter().try_for_each(|c| writer.write_i8(*c as i8))
    }
}

impl ReaderFrom for SecretKey {
    fn read_from<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        let parms_id: u64 = read_header(reader, KIND_SECRET_KEY)?;
        let n: usize = read_n(reader)?;
        let mut key: SecretKey = SecretKey {
            coeffs: vec![0; n],
            parms_id,
        };
        for c in key.coeffs.iter_mut() {
            let v: i8 = reader.read_i8()?;
            if !(-1..=1).contains(&v) {
                return Err(invalid(format!("secret coefficient {} is not ternary", v)));
            }
            *c = v as i64;
        }
        *self = key;
        Ok(())
    }
}

/// Body: the polynomials b and a.
impl WriterTo for PublicKey {
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_header(writer, KIND_PUBLIC_KEY, self.parms_id)?;
        write_polyrns(writer, &self.value[0])?;
        write_polyrns(writer, &self.value[1])
    }
}

impl ReaderFrom for PublicKey {
    fn read_from<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        let parms_id: u64 = read_header(reader, KIND_PUBLIC_KEY)?;
        let b: PolyRNS<u64> = read_polyrns(reader)?;
        let a: PolyRNS<u64> = read_polyrns(reader)?;
        self.value = [b, a];
        self.parms_id = parms_id;
        Ok(())
    }
}

/// Body: one switching key.
impl WriterTo for RelinKeys {
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_header(writer, KIND_RELIN_KEYS, self.parms_id)?;
        write_switching_key(writer, &self.key)
    }
}

impl ReaderFrom for RelinKeys {
    fn read_from<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        let parms_id: u64 = read_header(reader, KIND_RELIN_KEYS)?;
        let key: SwitchingKey = read_switching_key(reader)?;
        self.key = key;
        self.parms_id = parms_id;
        Ok(())
    }
}

/// Body: `count: u32`, then `(galois_element: u64, switching key)` pairs in
/// increasing element order, so equal key sets serialize identically.
impl WriterTo for GaloisKeys {
    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_header(writer, KIND_GALOIS_KEYS, self.parms_id)?;
        let elements: Vec<usize> = self.galois_elements();
        writer.write_u32::<LittleEndian>(elements.len() as u32)?;
        for gal_el in elements.iter() {
            writer.write_u64::<LittleEndian>(*gal_el as u64)?;
            if let Some(key) = self.keys.get(gal_el) {
                write_switching_key(writer, key)?;
            }
        }
        Ok(())
    }
}

impl ReaderFrom for GaloisKeys {
    fn read_from<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        let parms_id: u64 = read_header(reader, KIND_GALOIS_KEYS)?;
        let count: usize = read_len(reader, MAX_N, "count")?;
        let mut keys: FnvHashMap<usize, SwitchingKey> = FnvHashMap::default();
        for _ in 0..count {
            let gal_el: usize = reader.read_u64::<LittleEndian>()? as usize;
            let key: SwitchingKey = read_switching_key(reader)?;
            if keys.insert(gal_el, key).is_some() {
                return Err(invalid(format!("duplicate galois element {}", gal_el)));
            }
        }
        self.keys = keys;
        self.parms_id = parms_id;
        Ok(())
    }
}
