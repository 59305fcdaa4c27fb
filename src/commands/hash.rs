use unionfs_cow::error::Result;
use unionfs_cow::overlay::string_hash;

pub fn print_hash(input: &str) -> Result<i32> {
    println!("{}", string_hash(input));
    Ok(0)
}
