use probemap::{DoubleHash, Linear, OpenTable, ResizableTable, Strategy, TableConfig, TableError};

fn main() {
    println!("=== Probe Strategy Demo ===\n");

    // Example 1: where colliding keys end up
    demo_collisions();

    // Example 2: filling a fixed table
    demo_table_full();

    // Example 3: letting the table grow
    demo_growth();
}

fn demo_collisions() {
    println!("1. Keys sharing home slot 0 in an 11 slot table:");
    let keys = [0, 11, 22, 33];

    let mut linear = OpenTable::new(11).unwrap();
    let mut double = OpenTable::with_strategy(11, DoubleHash).unwrap();
    for key in keys {
        linear.put(key, ()).unwrap();
        double.put(key, ()).unwrap();
    }

    for key in keys {
        println!(
            "   key {key:>2}: linear probes {:?}",
            &linear.probe_sequence(key)[..4]
        );
        println!(
            "           double probes {:?} (h2 = {})",
            &double.probe_sequence(key)[..4],
            DoubleHash::secondary_hash(key as u64, 11)
        );
    }
    println!();
}

fn demo_table_full() {
    println!("2. A 3 slot linear table:");
    let mut table = OpenTable::with_strategy(3, Linear).unwrap();

    for key in 0..4 {
        match table.put(key, key * 100) {
            Ok(()) => println!("   put({key}) ok, load factor {:.2}", table.load_factor()),
            Err(TableError::TableFull { capacity }) => {
                println!("   put({key}) failed: all {capacity} slots taken")
            }
            Err(e) => println!("   put({key}) failed: {e}"),
        }
    }

    table.delete(1);
    println!("   after delete(1): {table:?}, {} tombstone", table.tombstones());
    println!();
}

fn demo_growth() {
    println!("3. Growing double hashing table:");
    let config = TableConfig::new().with_strategy(Strategy::DoubleHash);
    let mut table = ResizableTable::from_config(&config).unwrap();

    let mut last_capacity = table.capacity();
    for key in 0..100 {
        table.put(key, key.to_string()).unwrap();
        if table.capacity() != last_capacity {
            println!(
                "   after {} entries: {last_capacity} -> {} slots",
                table.len(),
                table.capacity()
            );
            last_capacity = table.capacity();
        }
    }
    println!(
        "   {} entries, {} resizes, table[42] = {:?}",
        table.len(),
        table.resizes(),
        table[42]
    );
}
