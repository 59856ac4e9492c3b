/// A `Table` renders a header and rows of preformatted cells as a bordered text grid, with every cell right aligned to the widest value in its column.
///
/// ```text
/// +------+----------+
/// |season|avg(count)|
/// +------+----------+
/// |   1.0|     116.3|
/// +------+----------+
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
	header: Vec<String>,
	rows: Vec<Vec<String>>,
}

impl Table {
	pub fn new(header: Vec<String>) -> Self {
		Self {
			header,
			rows: Vec::new(),
		}
	}

	/// Append a row. Rows shorter than the header are padded with empty cells and extra cells are dropped.
	pub fn push_row(&mut self, mut row: Vec<String>) {
		row.resize(self.header.len(), String::new());
		self.rows.push(row);
	}

	fn column_widths(&self) -> Vec<usize> {
		let mut column_widths: Vec<usize> = self
			.header
			.iter()
			.map(|header| header.chars().count())
			.collect();
		for row in self.rows.iter() {
			for (column_width, value) in column_widths.iter_mut().zip(row.iter()) {
				*column_width = usize::max(*column_width, value.chars().count());
			}
		}
		column_widths
	}
}

impl std::fmt::Display for Table {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		let column_widths = self.column_widths();
		let line = Line {
			column_widths: &column_widths,
		};
		writeln!(f, "{}", line)?;
		writeln!(
			f,
			"{}",
			Row {
				column_widths: &column_widths,
				values: &self.header,
			}
		)?;
		writeln!(f, "{}", line)?;
		for values in self.rows.iter() {
			writeln!(
				f,
				"{}",
				Row {
					column_widths: &column_widths,
					values,
				}
			)?;
		}
		write!(f, "{}", line)
	}
}

struct Line<'a> {
	column_widths: &'a [usize],
}

impl<'a> std::fmt::Display for Line<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "+")?;
		for column_width in self.column_widths.iter() {
			write!(f, "{}+", "-".repeat(*column_width))?;
		}
		Ok(())
	}
}

struct Row<'a> {
	column_widths: &'a [usize],
	values: &'a [String],
}

impl<'a> std::fmt::Display for Row<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "|")?;
		for (column_width, value) in self.column_widths.iter().zip(self.values) {
			let padding = column_width - value.chars().count();
			write!(f, "{}{}|", " ".repeat(padding), value)?;
		}
		Ok(())
	}
}

#[test]
fn test_table() {
	let mut table = Table::new(vec!["season".to_owned(), "avg(count)".to_owned()]);
	table.push_row(vec!["1.0".to_owned(), "116.3".to_owned()]);
	table.push_row(vec!["2.0".to_owned()]);
	let expected = "\
+------+----------+
|season|avg(count)|
+------+----------+
|   1.0|     116.3|
|   2.0|          |
+------+----------+";
	assert_eq!(table.to_string(), expected);
}
