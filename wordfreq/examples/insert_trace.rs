//! Print the tree after every insertion.
//!
//! With no arguments the default key sequence is used:
//!
//! ```bash
//! cargo run --example insert_trace
//! cargo run --example insert_trace -- 1 2 3 4 5 6 7
//! ```

use avl_rs::AvlTree;

const DEFAULT_KEYS: [i64; 10] = [70, 10, 60, 20, 50, 30, 40, 25, 27, 5];

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let keys: Vec<i64> = if args.is_empty() {
        DEFAULT_KEYS.to_vec()
    } else {
        args.iter()
            .map(|a| a.parse::<i64>())
            .collect::<Result<_, _>>()?
    };

    let mut tree: AvlTree<i64, ()> = AvlTree::new();
    for key in keys {
        println!("Insert: {key}");
        tree.insert(key, ());
        println!("Tree:");
        print!("{}", tree.pretty());
        tree.validate()?;
    }

    println!("\n(key, height, level), largest key first:");
    tree.visit_reverse(|key, height, level| println!("{key:>6} {height:>3} {level:>3}"));
    Ok(())
}
