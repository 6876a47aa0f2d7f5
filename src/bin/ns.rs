/* -*- coding: utf8 -*-
 *
 *  ns.rs: a command line client exercising the nodeset crate, heavily
 *  inspired by clustershell's nodeset command.
 *
 *  (C) Copyright 2022 - 2023 Olivier Delhomme
 *  e-mail : olivier.delhomme@free.fr
 *
 *  This program is free software; you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation; either version 3, or (at your option)
 *  any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program; if not, write to the Free Software Foundation,
 *  Inc., 59 Temple Place - Suite 330, Boston, MA 02111-1307, USA.
 */

use clap::{Args, Parser, Subcommand};
use eyre::{Context, Result};
use nodeset::NodeSet;

/// This program manages nodeset(s) and is heavily inspired by clustershell's nodeset command
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Arguments {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Count(Count),
    Expand(Expand),
    Fold(Fold),
    Regroup(Regroup),
    Split(Split),
}

/// counts the number of nodes in nodeset(s).
#[derive(Args, Debug)]
struct Count {
    /// sums all nodes of every given nodeset as if it was one nodeset
    #[arg(short, long)]
    total: bool,
    nodesets: Vec<String>,
}

/// expands nodeset(s) to separate nodes, as is.
#[derive(Args, Debug)]
struct Expand {
    /// character to use to separate nodes
    #[arg(short, long)]
    #[arg(default_value_t = ' ')]
    separator: char,

    nodesets: Vec<String>,
}

/// folds nodeset(s) into a synthetic notation
#[derive(Args, Debug)]
struct Fold {
    nodesets: Vec<String>,
}

/// rewrites nodeset(s) using groups, when a group resolver is configured
#[derive(Args, Debug)]
struct Regroup {
    nodesets: Vec<String>,
}

/// splits nodeset(s) into a given number of roughly equal-size nodesets
#[derive(Args, Debug)]
struct Split {
    /// number of nodesets to split into
    #[arg(short, long)]
    count: usize,
    nodesets: Vec<String>,
}

fn parse_all(nodesets: &[String]) -> Result<NodeSet> {
    let mut result = NodeSet::empty();
    for s in nodesets {
        result.update(s.as_str()).with_context(|| format!("parsing nodeset \"{s}\""))?;
    }
    Ok(result)
}

fn count(args: &Count) -> Result<()> {
    let mut total = 0;
    for node_str in &args.nodesets {
        let node = NodeSet::new(node_str.as_str()).with_context(|| format!("parsing nodeset \"{node_str}\""))?;
        if args.total {
            total += node.len();
        } else {
            println!("{}", node.len());
        }
    }
    if args.total {
        println!("{total}");
    }
    Ok(())
}

fn expand(args: &Expand) -> Result<()> {
    let separator = args.separator;
    for node_str in &args.nodesets {
        let node = NodeSet::new(node_str.as_str()).with_context(|| format!("parsing nodeset \"{node_str}\""))?;
        let rendered: Vec<String> = node.iter().collect();
        println!("{}", rendered.join(&separator.to_string()));
    }
    Ok(())
}

fn fold(args: &Fold) -> Result<()> {
    let node = parse_all(&args.nodesets)?;
    println!("{node}");
    Ok(())
}

fn regroup(args: &Regroup) -> Result<()> {
    let node = parse_all(&args.nodesets)?;
    println!("{}", node.regroup(None, false, false)?);
    Ok(())
}

fn split(args: &Split) -> Result<()> {
    let node = parse_all(&args.nodesets)?;
    for part in node.split(args.count)? {
        println!("{part}");
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Arguments::parse();

    match &args.command {
        Commands::Count(c) => count(c),
        Commands::Expand(e) => expand(e),
        Commands::Fold(f) => fold(f),
        Commands::Regroup(r) => regroup(r),
        Commands::Split(s) => split(s),
    }
}
