use crate::query::{
    ast::create_table::{ColumnDef, CreateTable},
    renderer::{Render, Renderer},
};

impl Render for CreateTable {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str("CREATE TABLE ");
        if self.if_not_exists {
            r.sql.push_str("IF NOT EXISTS ");
        }
        r.render_table_ref(&self.table);
        r.sql.push_str(" (");

        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                r.sql.push_str(", ");
            }
            col.render(r);
        }

        if !self.primary_key.is_empty() {
            let quoted: Vec<String> = self
                .primary_key
                .iter()
                .map(|c| r.dialect.quote_identifier(c))
                .collect();
            r.sql.push_str(", PRIMARY KEY (");
            r.sql.push_str(&quoted.join(", "));
            r.sql.push(')');
        }

        r.sql.push_str(");");
    }
}

impl Render for ColumnDef {
    fn render(&self, r: &mut Renderer) {
        r.sql.push_str(&r.dialect.quote_identifier(&self.name));
        r.sql.push(' ');
        r.sql.push_str(&r.dialect.render_data_type(&self.data_type));
        if !self.is_nullable {
            r.sql.push_str(" NOT NULL");
        }
    }
}
