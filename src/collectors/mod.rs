pub mod btrfs;
