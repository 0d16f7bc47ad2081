//! seclink: key generation and an encrypted record linkage demo.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use eyre::{eyre, Result, WrapErr};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use bfv::ParametersLiteral;
use seclink::{Context, EncryptedMatrix, KeyGenConfig, KeySet, Left, Matrix, Product, Right};

#[derive(Parser)]
#[command(name = "seclink")]
#[command(about = "Encrypted matrix multiplication")]
#[command(version)]
struct Args {
    /// log2 of the polynomial degree (12 to 14)
    #[arg(long, default_value = "12", global = true)]
    log_n: usize,

    /// Prime plaintext modulus, 1 modulo twice the polynomial degree
    #[arg(long, default_value = "40961", global = true)]
    plaintext_modulus: u64,

    /// 128-bit seed as two integers, for deterministic keys and encryptions
    #[arg(long, num_args = 2, value_names = ["HI", "LO"], global = true)]
    seed: Option<Vec<u64>>,

    /// Gadget width of the key switching keys
    #[arg(long, default_value = "30", global = true)]
    decomposition_bits: usize,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a key set and write the four keys to a directory
    Keygen {
        #[arg(long, default_value = "seclink_keys")]
        out_dir: PathBuf,
    },
    /// Multiply random binary matrices under encryption and check the result
    Demo {
        #[arg(long, default_value = "64")]
        rows: usize,

        #[arg(long, default_value = "32")]
        inner: usize,

        #[arg(long, default_value = "4")]
        cols: usize,

        /// Worker threads, each multiplying a slice of the right matrix columns
        #[arg(long, default_value = "1")]
        threads: usize,
    },
}

fn main() -> Result<()> {
    let args: Args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let seed: Option<[u64; 2]> = args.seed.as_ref().map(|s| [s[0], s[1]]);
    let literal: ParametersLiteral = ParametersLiteral {
        log_n: args.log_n,
        plaintext_modulus: args.plaintext_modulus,
        seed,
        decomposition_bits: args.decomposition_bits,
    };
    let context: Context = Context::from_literal(&literal).wrap_err("invalid parameters")?;
    let config: KeyGenConfig = KeyGenConfig {
        galois_key_bits: args.decomposition_bits,
        relin_key_bits: args.decomposition_bits,
    };

    match args.command {
        Command::Keygen { out_dir } => keygen(&context, config, &out_dir),
        Command::Demo {
            rows,
            inner,
            cols,
            threads,
        } => demo(&context, config, rows, inner, cols, threads, seed),
    }
}

fn keygen(context: &Context, config: KeyGenConfig, out_dir: &Path) -> Result<()> {
    info!(
        n = context.polynomial_degree(),
        plaintext_modulus = context.plaintext_modulus(),
        log_q = context.ring().parameters().log_q(),
        log_p = context.ring().parameters().log_p(),
        max_rows = context.max_rows(),
        "parameters"
    );

    let start: Instant = Instant::now();
    let keys: KeySet = context.generate_keys_with(config)?;
    info!("Key generation time: {:.2?}", start.elapsed());

    fs::create_dir_all(out_dir).wrap_err_with(|| format!("cannot create {}", out_dir.display()))?;
    for (name, blob) in [
        ("public-key", &keys.public_key),
        ("secret-key", &keys.secret_key),
        ("galois-keys", &keys.galois_keys),
        ("relinearisation-keys", &keys.relin_keys),
    ] {
        let path: PathBuf = out_dir.join(name);
        fs::write(&path, blob.as_bytes()).wrap_err_with(|| format!("cannot write {}", path.display()))?;
        info!("Wrote {} ({} bytes)", path.display(), blob.len());
    }
    keys.release();
    Ok(())
}

fn random_binary(rng: &mut StdRng, rows: usize, cols: usize) -> Result<Matrix> {
    Ok(Matrix::from_fn(rows, cols, |_, _| rng.random_range(0..2))?)
}

fn demo(
    context: &Context,
    config: KeyGenConfig,
    rows: usize,
    inner: usize,
    cols: usize,
    threads: usize,
    seed: Option<[u64; 2]>,
) -> Result<()> {
    if threads == 0 {
        return Err(eyre!("--threads must be positive"));
    }
    let mut rng: StdRng = match seed {
        Some([hi, lo]) => StdRng::seed_from_u64(hi ^ lo.rotate_left(32)),
        None => StdRng::from_os_rng(),
    };
    let a: Matrix = random_binary(&mut rng, rows, inner)?;
    let b: Matrix = random_binary(&mut rng, inner, cols)?;

    let start: Instant = Instant::now();
    let keys: KeySet = context.generate_keys_with(config)?;
    info!("Key generation time: {:.2?}", start.elapsed());

    let start: Instant = Instant::now();
    let left: EncryptedMatrix<Left> = context.encrypt_left(&a, keys.public_key.as_bytes())?;
    info!("Encrypted {}x{} left matrix into {} ciphertexts in {:.2?}", rows, inner, left.len(), start.elapsed());

    // column slices of even width keep the two columns of a ciphertext together
    let per_thread: usize = (cols.div_ceil(threads) + 1) & !1;
    let slices: Vec<(usize, Matrix)> = (0..cols)
        .step_by(per_thread)
        .map(|c0| -> Result<(usize, Matrix)> {
            let width: usize = per_thread.min(cols - c0);
            Ok((c0, Matrix::from_fn(inner, width, |i, j| b.get(i, c0 + j))?))
        })
        .collect::<Result<Vec<(usize, Matrix)>>>()?;

    let start: Instant = Instant::now();
    let products: Vec<(usize, Matrix)> = std::thread::scope(|s| {
        let handles: Vec<_> = slices
            .iter()
            .map(|(c0, slice)| {
                let (left, keys) = (&left, &keys);
                s.spawn(move || -> seclink::Result<(usize, Matrix)> {
                    let right: EncryptedMatrix<Right> = context.encrypt_right(slice, keys.public_key.as_bytes())?;
                    let product: EncryptedMatrix<Product> =
                        context.multiply(left, &right, keys.galois_keys.as_bytes())?;
                    Ok((*c0, context.decrypt(&product, keys.secret_key.as_bytes())?))
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| -> Result<(usize, Matrix)> {
                h.join().map_err(|_| eyre!("worker thread panicked"))?.map_err(eyre::Report::from)
            })
            .collect::<Result<Vec<(usize, Matrix)>>>()
    })?;
    info!(
        "Multiplied {}x{} by {}x{} on {} threads in {:.2?}",
        rows,
        inner,
        inner,
        cols,
        products.len(),
        start.elapsed()
    );

    let expected: Matrix = a.matmul(&b)?.centered(context.plaintext_modulus());
    for (c0, product) in products.iter() {
        for i in 0..rows {
            for j in 0..product.cols() {
                if product.get(i, j) != expected.get(i, c0 + j) {
                    return Err(eyre!(
                        "mismatch at ({}, {}): {} != {}",
                        i,
                        c0 + j,
                        product.get(i, j),
                        expected.get(i, c0 + j)
                    ));
                }
            }
        }
    }
    info!("Decrypted product matches the plaintext product");
    keys.release();
    Ok(())
}
