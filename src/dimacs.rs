use std::fs;

use bit_set::BitSet;
use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_until};
use nom::character::complete::{char, digit1, multispace0, space1};
use nom::combinator::map_res;
use nom::multi::many0;
use nom::sequence::{preceded, separated_pair, terminated};

use crate::color::VertexId;

/// reads an instance from a DIMACS (.col) file, returns (n,m,adj_list)
pub fn read_from_file(filename: &str) -> (usize, usize, Vec<Vec<VertexId>>) {
    let content = fs::read_to_string(filename)
        .expect("read_from_file: unable to read the instance file")
        .replace('\r', "");
    parse_instance(content.as_str())
}

/** parses the body of a DIMACS instance: comment lines ("c ..."), a header
("p edge n m" or "p col n m"), then one "e u v" line per edge (1-indexed).
Duplicate edge lines are stored once. */
pub fn parse_instance(content: &str) -> (usize, usize, Vec<Vec<VertexId>>) {
    let after_comments = skip_comments(content)
        .expect("parse_instance: unreachable (comments are optional)").0;
    let (mut rest, (n, m)) = terminated(read_header, multispace0)(after_comments)
        .unwrap_or_else(|_| panic!("parse_instance: invalid DIMACS header"));
    let mut adj_list = vec![Vec::new(); n];
    let mut adj_sets = vec![BitSet::with_capacity(n); n];
    let mut nb_edge_lines = 0;
    while let Ok((remaining, (a, b))) = terminated(read_edge, multispace0)(rest) {
        rest = remaining;
        nb_edge_lines += 1;
        assert!(
            1 <= a && a <= n && 1 <= b && b <= n,
            "parse_instance: edge ({},{}) out of range (n={})", a, b, n
        );
        let (u, v) = (a - 1, b - 1); // DIMACS vertices are 1-indexed
        if !adj_sets[u].contains(v) {
            adj_sets[u].insert(v);
            adj_sets[v].insert(u);
            adj_list[u].push(v);
            adj_list[v].push(u);
        }
    }
    // some files count each direction, some count each pair
    assert!(
        nb_edge_lines == m || 2 * nb_edge_lines == m,
        "check: {}\t m: {}", nb_edge_lines, m
    );
    (n, m, adj_list)
}

/// reads an integer
fn number(s: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse)(s)
}

/// skips a single comment line
fn skip_comment(s: &str) -> IResult<&str, &str> {
    preceded(char('c'), terminated(take_until("\n"), char('\n')))(s)
}

/// skips all comment lines
pub fn skip_comments(s: &str) -> IResult<&str, Vec<&str>> {
    many0(skip_comment)(s)
}

/// reads the header containing (n,m)
pub fn read_header(s: &str) -> IResult<&str, (usize, usize)> {
    preceded(
        alt((tag("p edge "), tag("p col "))),
        separated_pair(number, space1, number),
    )(s)
}

/// reads an edge line (WARNING: indices start at 1 in the DIMACS format)
pub fn read_edge(s: &str) -> IResult<&str, (usize, usize)> {
    preceded(tag("e "), separated_pair(number, space1, number))(s)
}


#[cfg(test)]
mod tests {
    use super::*;

    use crate::color::ConflictGraph;

    #[test]
    fn test_read_triangle() {
        let (n, m, adj_list) = read_from_file("insts/triangle.col");
        assert_eq!(n, 3);
        assert_eq!(m, 3);
        assert_eq!(adj_list[0], vec![1,2]);
        assert_eq!(adj_list[1], vec![0,2]);
        assert_eq!(adj_list[2], vec![0,1]);
    }

    #[test]
    fn test_read_grid() {
        let (n, m, adj_list) = read_from_file("insts/grid2x2.col");
        assert_eq!(n, 4);
        assert_eq!(m, 4);
        assert_eq!(adj_list[0], vec![1,2]);
    }

    #[test]
    fn test_instance_from_file() {
        let inst = ConflictGraph::from_file("insts/petersen.col").unwrap();
        assert_eq!(inst.nb_vertices(), 10);
        assert_eq!(inst.nb_edges(), 15);
        for v in 0..10 {
            assert_eq!(inst.degree(v), 3);
        }
    }

    #[test]
    fn test_skip_comments() {
        let s = "c this is a test comment\np edge 2 1\ne 1 2\n";
        assert_eq!(
            skip_comments(s),
            Ok(("p edge 2 1\ne 1 2\n", vec![" this is a test comment"]))
        );
        // no comments: nothing consumed
        assert_eq!(skip_comments("p edge 2 1\n").unwrap().0, "p edge 2 1\n");
    }

    #[test]
    fn test_read_header() {
        let s = "p edge 2 1\ne 1 2\n";
        assert_eq!(read_header(s).unwrap().1, (2,1));
        assert_eq!(read_header(s).unwrap().0, "\ne 1 2\n");
    }

    #[test]
    fn test_read_header_col() {
        let s = "p col 2 1\ne 1 2\n";
        assert_eq!(read_header(s).unwrap().1, (2,1));
    }

    #[test]
    fn test_read_edge() {
        let s = "e 1 2\n";
        assert_eq!(read_edge(s).unwrap().1, (1,2));
        assert_eq!(read_edge(s).unwrap().0, "\n");
    }

    #[test]
    fn test_parse_instance_duplicate_edges() {
        let s = "p edge 2 2\ne 1 2\ne 2 1\n";
        let (n, m, adj_list) = parse_instance(s);
        assert_eq!(n, 2);
        assert_eq!(m, 2);
        assert_eq!(adj_list[0], vec![1]); // the duplicate is stored once
        assert_eq!(adj_list[1], vec![0]);
    }

    #[test]
    #[should_panic]
    fn test_parse_instance_bad_header() {
        parse_instance("q edge 2 1\ne 1 2\n");
    }
}
